//! Tile-grid map storage.
//!
//! Attributes live in parallel arrays indexed by `row * cols + col`, which
//! is the layout the span generator walks. Heights are 1/64 of a tile.

use bitflags::bitflags;
use glam::IVec2;

use super::doors::{Door, DoorId};
use super::texture::{NO_TEXTURE, TextureId};
use crate::defs::{PlaneFlags, WallFlags};
use crate::engine::fixed::Fixed;
use crate::engine::spans::Shade;

/// Height units per tile.
pub const HEIGHT_UNIT: i16 = 64;

/// Texture index meaning “no wall here”.
pub const NO_WALL: TextureId = NO_TEXTURE;

#[inline]
pub fn height_to_fixed(h: i16) -> Fixed {
    Fixed::from_raw((h as i32) << 10)
}

/*──────────────────────── orientation ───────────────────────────*/

/// Tile face, named after the map direction it faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Step to the neighbouring tile across this face.
    pub fn offset(self) -> IVec2 {
        match self {
            Orientation::North => IVec2::new(0, -1),
            Orientation::East => IVec2::new(1, 0),
            Orientation::South => IVec2::new(0, 1),
            Orientation::West => IVec2::new(-1, 0),
        }
    }

    pub fn face(self) -> Faces {
        Faces::from_bits_truncate(1 << self as u8)
    }
}

bitflags! {
    /// Set of tile faces, e.g. the faces of a tile the viewer can see.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Faces: u8 {
        const NORTH = 1 << 0;
        const EAST  = 1 << 1;
        const SOUTH = 1 << 2;
        const WEST  = 1 << 3;
    }
}

impl Faces {
    pub fn orientations(self) -> impl Iterator<Item = Orientation> {
        Orientation::ALL
            .into_iter()
            .filter(move |o| self.contains(o.face()))
    }

    /// Faces of `tile` whose outer side contains the point `(x, y)`.
    pub fn facing_point(tile: IVec2, x: Fixed, y: Fixed) -> Self {
        let (c, r) = (Fixed::from_int(tile.x), Fixed::from_int(tile.y));
        let mut f = Faces::empty();
        f.set(Faces::NORTH, y < r);
        f.set(Faces::SOUTH, y > r + Fixed::ONE);
        f.set(Faces::WEST, x < c);
        f.set(Faces::EAST, x > c + Fixed::ONE);
        f
    }
}

/*──────────────────────── attributes ────────────────────────────*/

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallAttr {
    pub texture: TextureId,
    pub flags: WallFlags,
}

/// Plane rising by `rise` height units toward `toward`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Slope {
    #[default]
    Flat,
    Rise { toward: Orientation, rise: i16 },
}

/// Diagonal split of a plane into two triangles; the second triangle sits
/// at `height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiagonalSplit {
    #[default]
    None,
    NwSe { height: i16 },
    NeSw { height: i16 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneAttr {
    pub texture: TextureId,
    pub height: i16,
    pub flags: PlaneFlags,
    pub slope: Slope,
    pub split: DiagonalSplit,
}

impl PlaneAttr {
    pub fn flat(texture: TextureId, height: i16) -> Self {
        Self {
            texture,
            height,
            ..Self::default()
        }
    }
}

/// Textures shared by every door's frame and jamb.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoorTextures {
    pub frame: TextureId,
    pub jamb: TextureId,
}

/// Things that can go wrong while editing the map.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("tile ({0}, {1}) is outside the map")]
    OutOfBounds(i32, i32),

    #[error("tile ({0}, {1}) already holds a door")]
    DoorExists(i32, i32),
}

/*──────────────────────── map ───────────────────────────────────*/

pub struct TileMap {
    cols: usize,
    rows: usize,
    pub walls: Vec<WallAttr>,
    pub floors: Vec<PlaneAttr>,
    pub ceilings: Vec<PlaneAttr>,
    pub light: Vec<u8>,
    pub effect: Vec<u8>,
    /// Texture animation: `translation[id]` is what `id` currently shows.
    translation: Vec<TextureId>,
    doors: Vec<Door>,
    door_at: Vec<Option<DoorId>>,
    pub door_textures: DoorTextures,
}

impl TileMap {
    /// Open map with floor 0, ceiling one tile up and mid light.
    pub fn new(cols: usize, rows: usize, floor: TextureId, ceiling: TextureId) -> Self {
        let n = cols * rows;
        Self {
            cols,
            rows,
            walls: vec![WallAttr::default(); n],
            floors: vec![PlaneAttr::flat(floor, 0); n],
            ceilings: vec![PlaneAttr::flat(ceiling, HEIGHT_UNIT); n],
            light: vec![192; n],
            effect: vec![0; n],
            translation: Vec::new(),
            doors: Vec::new(),
            door_at: vec![None; n],
            door_textures: DoorTextures::default(),
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flat index of `tile`, or `None` outside the map.
    #[inline]
    pub fn index(&self, tile: IVec2) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 || tile.x as usize >= self.cols || tile.y as usize >= self.rows
        {
            return None;
        }
        Some(tile.y as usize * self.cols + tile.x as usize)
    }

    pub fn coords(&self, idx: usize) -> IVec2 {
        IVec2::new((idx % self.cols) as i32, (idx / self.cols) as i32)
    }

    fn checked(&self, tile: IVec2) -> Result<usize, MapError> {
        self.index(tile)
            .ok_or(MapError::OutOfBounds(tile.x, tile.y))
    }

    pub fn set_wall(&mut self, tile: IVec2, wall: WallAttr) -> Result<(), MapError> {
        let i = self.checked(tile)?;
        self.walls[i] = wall;
        Ok(())
    }

    pub fn set_floor(&mut self, tile: IVec2, plane: PlaneAttr) -> Result<(), MapError> {
        let i = self.checked(tile)?;
        self.floors[i] = plane;
        Ok(())
    }

    pub fn set_ceiling(&mut self, tile: IVec2, plane: PlaneAttr) -> Result<(), MapError> {
        let i = self.checked(tile)?;
        self.ceilings[i] = plane;
        Ok(())
    }

    pub fn set_light(&mut self, tile: IVec2, light: u8, effect: u8) -> Result<(), MapError> {
        let i = self.checked(tile)?;
        self.light[i] = light;
        self.effect[i] = effect;
        Ok(())
    }

    /// Surround the map with `wall`.
    pub fn border(&mut self, wall: WallAttr) {
        for c in 0..self.cols {
            self.walls[c] = wall;
            self.walls[(self.rows - 1) * self.cols + c] = wall;
        }
        for r in 0..self.rows {
            self.walls[r * self.cols] = wall;
            self.walls[r * self.cols + self.cols - 1] = wall;
        }
    }

    #[inline]
    pub fn is_solid(&self, idx: usize) -> bool {
        self.walls[idx].texture != NO_WALL
    }

    /// Selector for spans generated inside tile `idx`.
    pub fn shade(&self, idx: usize) -> Shade {
        match self.effect[idx] {
            0 => Shade::Light(self.light[idx]),
            fx => Shade::Colormap(fx),
        }
    }

    /*──────── texture animation ────────*/

    /// Texture currently displayed for `tex`.
    #[inline]
    pub fn translate(&self, tex: TextureId) -> TextureId {
        self.translation.get(tex as usize).copied().unwrap_or(tex)
    }

    pub fn set_translation(&mut self, from: TextureId, to: TextureId) {
        let need = from as usize + 1;
        if self.translation.len() < need {
            let start = self.translation.len();
            self.translation
                .extend((start..need).map(|i| i as TextureId));
        }
        self.translation[from as usize] = to;
    }

    /*──────── doors ────────*/

    pub fn add_door(&mut self, door: Door) -> Result<DoorId, MapError> {
        let i = self.checked(door.tile)?;
        if self.door_at[i].is_some() {
            return Err(MapError::DoorExists(door.tile.x, door.tile.y));
        }
        let id = self.doors.len() as DoorId;
        self.doors.push(door);
        self.door_at[i] = Some(id);
        Ok(id)
    }

    pub fn door_at(&self, idx: usize) -> Option<DoorId> {
        self.door_at.get(idx).copied().flatten()
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(id as usize)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::doors::DoorAxis;

    #[test]
    fn index_round_trips_and_rejects_outside() {
        let map = TileMap::new(5, 4, 1, 2);
        let t = IVec2::new(3, 2);
        let i = map.index(t).unwrap();
        assert_eq!(i, 13);
        assert_eq!(map.coords(i), t);
        assert_eq!(map.index(IVec2::new(5, 0)), None);
        assert_eq!(map.index(IVec2::new(0, -1)), None);
    }

    #[test]
    fn shade_prefers_effect() {
        let mut map = TileMap::new(2, 2, 1, 2);
        map.set_light(IVec2::new(0, 0), 40, 0).unwrap();
        map.set_light(IVec2::new(1, 0), 40, 3).unwrap();
        assert_eq!(map.shade(0), Shade::Light(40));
        assert_eq!(map.shade(1), Shade::Colormap(3));
    }

    #[test]
    fn translation_defaults_to_identity() {
        let mut map = TileMap::new(1, 1, 1, 2);
        assert_eq!(map.translate(7), 7);
        map.set_translation(4, 9);
        assert_eq!(map.translate(4), 9);
        assert_eq!(map.translate(3), 3);
        assert_eq!(map.translate(40), 40);
    }

    #[test]
    fn border_makes_edges_solid() {
        let mut map = TileMap::new(4, 3, 1, 2);
        map.border(WallAttr {
            texture: 5,
            flags: WallFlags::empty(),
        });
        assert!(map.is_solid(0));
        assert!(map.is_solid(11));
        assert!(!map.is_solid(map.index(IVec2::new(1, 1)).unwrap()));
    }

    #[test]
    fn one_door_per_tile() {
        let mut map = TileMap::new(3, 3, 1, 2);
        let door = Door::new(IVec2::new(1, 1), DoorAxis::EastWest, 4);
        assert_eq!(map.add_door(door), Ok(0));
        assert_eq!(map.add_door(door), Err(MapError::DoorExists(1, 1)));
        assert_eq!(map.door_at(4), Some(0));
        let far = Door::new(IVec2::new(9, 9), DoorAxis::EastWest, 4);
        assert_eq!(map.add_door(far), Err(MapError::OutOfBounds(9, 9)));
    }

    #[test]
    fn faces_toward_point() {
        let t = IVec2::new(2, 2);
        let f = Faces::facing_point(t, Fixed::from_f32(0.5), Fixed::from_f32(2.5));
        assert_eq!(f, Faces::WEST);
        let f = Faces::facing_point(t, Fixed::from_f32(3.5), Fixed::from_f32(3.5));
        assert_eq!(f, Faces::EAST | Faces::SOUTH);
        assert_eq!(f.orientations().collect::<Vec<_>>(), vec![
            Orientation::East,
            Orientation::South
        ]);
    }
}
