//! Sliding doors.
//!
//! A door is drawn as up to three thin vertical planes parallel to its
//! face, front to back:
//!
//! | part  | depth into tile | travel (along the face) | rows                      |
//! |-------|-----------------|-------------------------|---------------------------|
//! | Leaf  | ½ − 1/32        | `[open, 1)`             | floor → ceiling − header  |
//! | Frame | ½               | `[0, open)`             | header                    |
//! | Jamb  | ½ + 1/32        | `[0, 1)`                | header                    |
//!
//! Every column becomes a pending post plus a `Door`/`MaskedDoor` span.

use super::{
    context::RenderContext,
    error::RenderError,
    fixed::{FRACUNIT, Fixed},
    overlay::Marker,
    spans::{PostRef, SpanPayload, SpanRecord},
    walls::{WallPlane, column_loop, post_index, scaled_post},
};
use crate::world::{DoorAxis, DoorId, Orientation, TextureId, TileMap, height_to_fixed};

/// Height of the lintel above an open door.
pub const HEADER: Fixed = Fixed::from_raw(FRACUNIT / 8);

const SKIN: Fixed = Fixed::from_raw(FRACUNIT / 32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorPart {
    Leaf,
    Frame,
    Jamb,
}

impl DoorPart {
    /// Drawing order, nearest first.
    pub const ORDER: [DoorPart; 3] = [DoorPart::Leaf, DoorPart::Frame, DoorPart::Jamb];

    /// Distance of the part's plane from the camera-side tile edge.
    pub fn depth_offset(self) -> Fixed {
        match self {
            DoorPart::Leaf => Fixed::HALF - SKIN,
            DoorPart::Frame => Fixed::HALF,
            DoorPart::Jamb => Fixed::HALF + SKIN,
        }
    }

    /// Covered stretch of the face, in world offset from the tile's low edge.
    pub fn travel(self, open: Fixed) -> (Fixed, Fixed) {
        match self {
            DoorPart::Leaf => (open, Fixed::ONE),
            DoorPart::Frame => (Fixed::ZERO, open),
            DoorPart::Jamb => (Fixed::ZERO, Fixed::ONE),
        }
    }

    /// `(top, bottom)` absolute heights.
    pub fn rows(self, floor: Fixed, ceiling: Fixed) -> (Fixed, Fixed) {
        let lintel = (ceiling - HEADER).max(floor);
        match self {
            DoorPart::Leaf => (lintel, floor),
            DoorPart::Frame | DoorPart::Jamb => (ceiling, lintel),
        }
    }

    /// Only the jamb is still drawn for a shut door.
    #[inline]
    pub fn drawn_when_closed(self) -> bool {
        self == DoorPart::Jamb
    }
}

/// Which side of the door the camera is on: the seen face, the x or y of
/// the camera-side tile edge, and the along-face start.
fn camera_side(ctx: &RenderContext, axis: DoorAxis) -> (Orientation, Fixed, Fixed) {
    let t = ctx.tile;
    let (col, row) = (Fixed::from_int(t.x), Fixed::from_int(t.y));
    match axis {
        DoorAxis::EastWest if ctx.view.x < col + Fixed::HALF => (Orientation::West, col, row),
        DoorAxis::EastWest => (Orientation::East, col + Fixed::ONE, row),
        DoorAxis::NorthSouth if ctx.view.y < row + Fixed::HALF => (Orientation::North, row, col),
        DoorAxis::NorthSouth => (Orientation::South, row + Fixed::ONE, col),
    }
}

/// Door `id`, which must stand in the current tile.
pub fn render_door(ctx: &mut RenderContext, map: &TileMap, id: DoorId) -> Result<(), RenderError> {
    let Some(door) = map.door(id).copied() else {
        return Ok(());
    };
    let Some(idx) = map.index(door.tile) else {
        return Ok(());
    };
    let floor = height_to_fixed(map.floors[idx].height);
    let ceiling = height_to_fixed(map.ceilings[idx].height);

    let view = ctx.view;
    let (face, edge, start) = camera_side(ctx, door.axis);
    ctx.buffers.overlay.mark(door.tile, face, Marker::Door);
    let inward = matches!(face, Orientation::West | Orientation::North);
    let shade = ctx.shade;

    let mut first = true;
    for part in DoorPart::ORDER {
        if door.is_closed() && !part.drawn_when_closed() {
            continue;
        }
        let line = if inward {
            edge + part.depth_offset()
        } else {
            edge - part.depth_offset()
        };
        let plane = WallPlane::new(view, face, line, start);
        if !plane.visible() {
            continue;
        }
        let (s_lo, s_hi) = part.travel(door.position);
        if s_lo >= s_hi {
            continue;
        }
        let (u_lo, u_hi) = match face {
            Orientation::West | Orientation::South => (s_lo, s_hi),
            Orientation::East | Orientation::North => (Fixed::ONE - s_hi, Fixed::ONE - s_lo),
        };
        let Some((x1, x2)) = plane.screen_extent(view, ctx.window, u_lo, u_hi) else {
            continue;
        };

        let (top, bottom) = part.rows(floor, ceiling);
        let texture: TextureId = map.translate(match part {
            DoorPart::Leaf => door.leaf_texture,
            DoorPart::Frame => map.door_textures.frame,
            DoorPart::Jamb => map.door_textures.jamb,
        });
        let masked = part == DoorPart::Leaf && door.transparent;

        let completed = column_loop(view, &plane, x1, x2, u_lo, u_hi, !first, |col| {
            let s = plane.u_of(col.u);
            let s = if part == DoorPart::Leaf {
                s - door.position
            } else {
                s
            };
            let source = PostRef {
                texture,
                post: post_index(s, 0),
            };
            let Some(draw) = scaled_post(view, col.x, top, bottom, col.depth, source, shade) else {
                return Ok(());
            };
            let post = ctx.buffers.posts.push(draw)?;
            let payload = if masked {
                SpanPayload::MaskedDoor {
                    door: id,
                    part,
                    column: col.x,
                    post,
                }
            } else {
                SpanPayload::Door {
                    door: id,
                    part,
                    column: col.x,
                    post,
                }
            };
            ctx.buffers.spans.push(SpanRecord {
                depth: col.depth,
                shade,
                payload,
            })?;
            Ok(())
        })?;
        if !completed {
            break;
        }
        first = false;
    }
    Ok(())
}
