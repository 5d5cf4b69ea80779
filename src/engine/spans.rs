//! Frame output: the depth-sortable span list and the pending post queue.
//!
//! Both are append-only during generation and bounded; running out of room
//! is a [`RenderError`], never a silent truncation.

use hecs::Entity;

use super::{doors::DoorPart, error::RenderError, fixed::Fixed};
use crate::world::{DoorId, TextureId};

/*──────────────────────────── shading ────────────────────────────*/

/// Light/shadow selector carried by every span and post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shade {
    /// Per-tile light level, 255 = brightest.
    Light(u8),
    /// Special-effect colormap selected by the tile's effect byte.
    Colormap(u8),
}

pub const FULLBRIGHT: Shade = Shade::Light(255);

/*──────────────────────────── posts ──────────────────────────────*/

/// One of the 64 posts of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostRef {
    pub texture: TextureId,
    pub post: u8,
}

/// A scaled vertical strip: `count` rows starting at `top` in `column`.
///
/// `tex_start`/`tex_step` walk the post in texels (16.16).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostDraw {
    pub column: i32,
    pub top: i32,
    pub count: i32,
    pub source: PostRef,
    pub shade: Shade,
    pub tex_start: Fixed,
    pub tex_step: Fixed,
}

pub type PostIndex = u32;

/// Translucent and masked columns waiting for the compositor.
pub struct PostQueue {
    posts: Vec<PostDraw>,
    capacity: usize,
}

impl PostQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            posts: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, post: PostDraw) -> Result<PostIndex, RenderError> {
        if self.posts.len() >= self.capacity {
            log::error!("pending post queue overflow at {} entries", self.capacity);
            return Err(RenderError::PostQueueFull {
                capacity: self.capacity,
            });
        }
        self.posts.push(post);
        Ok((self.posts.len() - 1) as PostIndex)
    }

    pub fn get(&self, idx: PostIndex) -> Option<&PostDraw> {
        self.posts.get(idx as usize)
    }

    pub fn as_slice(&self) -> &[PostDraw] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.posts.clear();
    }
}

/*──────────────────────────── records ────────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpanKind {
    Flat,
    Sloped,
    Door,
    Sprite,
    MaskedDoor,
    TranslucentWall,
    Step,
    Sky,
    SkyColumn,
    InvisibleWall,
}

impl SpanKind {
    pub const ALL: [SpanKind; 10] = [
        SpanKind::Flat,
        SpanKind::Sloped,
        SpanKind::Door,
        SpanKind::Sprite,
        SpanKind::MaskedDoor,
        SpanKind::TranslucentWall,
        SpanKind::Step,
        SpanKind::Sky,
        SpanKind::SkyColumn,
        SpanKind::InvisibleWall,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanPayload {
    Flat {
        texture: TextureId,
        row: i32,
        x1: i32,
        x2: i32,
    },
    Sky {
        texture: TextureId,
        row: i32,
        x1: i32,
        x2: i32,
    },
    /// `end_depth` is the depth at `x2 - 1`; the record depth is at `x1`.
    Sloped {
        texture: TextureId,
        row: i32,
        x1: i32,
        x2: i32,
        end_depth: Fixed,
    },
    TranslucentWall { column: i32, post: PostIndex },
    InvisibleWall { column: i32, post: PostIndex },
    Step { column: i32, post: PostIndex },
    SkyColumn { column: i32, post: PostIndex },
    Door {
        door: DoorId,
        part: DoorPart,
        column: i32,
        post: PostIndex,
    },
    MaskedDoor {
        door: DoorId,
        part: DoorPart,
        column: i32,
        post: PostIndex,
    },
    Sprite {
        entity: Entity,
        picture: u16,
        screen_x: i32,
        view_x: Fixed,
        z_offset: Fixed,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanRecord {
    pub depth: Fixed,
    pub shade: Shade,
    pub payload: SpanPayload,
}

impl SpanRecord {
    pub fn kind(&self) -> SpanKind {
        match self.payload {
            SpanPayload::Flat { .. } => SpanKind::Flat,
            SpanPayload::Sky { .. } => SpanKind::Sky,
            SpanPayload::Sloped { .. } => SpanKind::Sloped,
            SpanPayload::TranslucentWall { .. } => SpanKind::TranslucentWall,
            SpanPayload::InvisibleWall { .. } => SpanKind::InvisibleWall,
            SpanPayload::Step { .. } => SpanKind::Step,
            SpanPayload::SkyColumn { .. } => SpanKind::SkyColumn,
            SpanPayload::Door { .. } => SpanKind::Door,
            SpanPayload::MaskedDoor { .. } => SpanKind::MaskedDoor,
            SpanPayload::Sprite { .. } => SpanKind::Sprite,
        }
    }

    /// Depth used for ordering; sloped runs sort by their nearer end.
    pub fn sort_depth(&self) -> Fixed {
        match self.payload {
            SpanPayload::Sloped { end_depth, .. } => self.depth.min(end_depth),
            _ => self.depth,
        }
    }

    /// Index into the post queue, for column-shaped spans.
    pub fn post(&self) -> Option<PostIndex> {
        match self.payload {
            SpanPayload::TranslucentWall { post, .. }
            | SpanPayload::InvisibleWall { post, .. }
            | SpanPayload::Step { post, .. }
            | SpanPayload::SkyColumn { post, .. }
            | SpanPayload::Door { post, .. }
            | SpanPayload::MaskedDoor { post, .. } => Some(post),
            _ => None,
        }
    }
}

/*──────────────────────────── sort key ───────────────────────────*/

const INDEX_BITS: u32 = 44;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;
const DEPTH_SHIFT: u32 = 4;
const DEPTH_MAX: u64 = 0xF_FFFF;

/// Deepest depth the sort key still tells apart; keys saturate beyond it.
pub const MAX_SORT_DEPTH: Fixed = Fixed::from_raw((DEPTH_MAX << DEPTH_SHIFT) as i32);

/// `depth:20 | index:44`, so sorting keys sorts by depth then insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(u64);

impl SortKey {
    pub fn new(depth: Fixed, index: usize) -> Self {
        let d = ((depth.raw().max(0) as u64) >> DEPTH_SHIFT).min(DEPTH_MAX);
        Self((d << INDEX_BITS) | (index as u64 & INDEX_MASK))
    }

    #[inline]
    pub fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    #[inline]
    pub fn depth_bits(self) -> u32 {
        (self.0 >> INDEX_BITS) as u32
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/*──────────────────────────── span list ──────────────────────────*/

pub struct SpanList {
    records: Vec<SpanRecord>,
    keys: Vec<SortKey>,
    capacity: usize,
}

impl SpanList {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record and its key; returns the record index.
    pub fn push(&mut self, record: SpanRecord) -> Result<usize, RenderError> {
        let idx = self.records.len();
        if idx >= self.capacity {
            log::error!("span list overflow at {} records", self.capacity);
            return Err(RenderError::SpanListFull {
                capacity: self.capacity,
            });
        }
        self.keys.push(SortKey::new(record.sort_depth(), idx));
        self.records.push(record);
        Ok(idx)
    }

    pub fn records(&self) -> &[SpanRecord] {
        &self.records
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn get(&self, idx: usize) -> Option<&SpanRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.keys.clear();
    }

    /// Record indices nearest-first.
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut keys = self.keys.clone();
        keys.sort_unstable();
        keys.into_iter().map(SortKey::index).collect()
    }

    /// Number of records of each kind, in [`SpanKind::ALL`] order.
    pub fn histogram(&self) -> [(SpanKind, usize); 10] {
        let mut out = SpanKind::ALL.map(|k| (k, 0));
        for r in &self.records {
            let k = r.kind();
            if let Some(slot) = out.iter_mut().find(|(kind, _)| *kind == k) {
                slot.1 += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(depth: Fixed, x1: i32) -> SpanRecord {
        SpanRecord {
            depth,
            shade: Shade::Light(128),
            payload: SpanPayload::Flat {
                texture: 1,
                row: 10,
                x1,
                x2: x1 + 4,
            },
        }
    }

    #[test]
    fn keys_follow_depth_then_index() {
        let mut list = SpanList::new(16);
        for i in 0..5 {
            list.push(flat(Fixed::from_int(i + 1), i)).unwrap();
        }
        assert!(list.keys().windows(2).all(|w| w[0] < w[1]));

        // equal depths keep insertion order
        let mut list = SpanList::new(16);
        let d = Fixed::from_int(3);
        list.push(flat(Fixed::from_int(5), 0)).unwrap();
        list.push(flat(d, 1)).unwrap();
        list.push(flat(d, 2)).unwrap();
        list.push(flat(Fixed::ONE, 3)).unwrap();
        assert_eq!(list.sorted_indices(), vec![3, 1, 2, 0]);
    }

    #[test]
    fn sorted_keys_recover_records() {
        let mut list = SpanList::new(8);
        let depths = [7, 2, 9, 2, 4];
        for (i, d) in depths.iter().enumerate() {
            list.push(flat(Fixed::from_int(*d), i as i32)).unwrap();
        }
        let order = list.sorted_indices();
        let recovered: Vec<i32> = order
            .iter()
            .map(|&i| match list.get(i).unwrap().payload {
                SpanPayload::Flat { x1, .. } => x1,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(recovered, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn key_depth_saturates() {
        let k = SortKey::new(Fixed::MAX, 3);
        assert_eq!(k.depth_bits(), DEPTH_MAX as u32);
        assert_eq!(k.index(), 3);
        assert_eq!(SortKey::new(-Fixed::ONE, 0).depth_bits(), 0);
    }

    #[test]
    fn sloped_spans_key_on_nearer_end() {
        let rec = SpanRecord {
            depth: Fixed::from_int(6),
            shade: Shade::Light(0),
            payload: SpanPayload::Sloped {
                texture: 2,
                row: 150,
                x1: 0,
                x2: 10,
                end_depth: Fixed::from_int(2),
            },
        };
        assert_eq!(rec.sort_depth(), Fixed::from_int(2));
        assert_eq!(rec.kind(), SpanKind::Sloped);
    }

    #[test]
    fn overflow_fails_once_and_keeps_records() {
        let mut list = SpanList::new(3);
        for i in 0..3 {
            list.push(flat(Fixed::ONE, i)).unwrap();
        }
        let before = list.records().to_vec();
        assert_eq!(
            list.push(flat(Fixed::ONE, 99)),
            Err(RenderError::SpanListFull { capacity: 3 })
        );
        assert_eq!(list.records(), &before[..]);
        assert_eq!(list.keys().len(), 3);
    }

    #[test]
    fn post_queue_capacity() {
        let post = PostDraw {
            column: 0,
            top: 0,
            count: 1,
            source: PostRef {
                texture: 0,
                post: 0,
            },
            shade: FULLBRIGHT,
            tex_start: Fixed::ZERO,
            tex_step: Fixed::ONE,
        };
        let mut q = PostQueue::new(1);
        assert_eq!(q.push(post), Ok(0));
        assert_eq!(q.push(post), Err(RenderError::PostQueueFull { capacity: 1 }));
        assert_eq!(q.len(), 1);
        q.clear();
        assert!(q.is_empty());
    }
}
