//! Near-plane clipping.
//!
//! * [`clip_edge`]: two view-space endpoints of a vertical surface (walls,
//!   door parts) → their screen columns.
//! * [`clip_polygon`]: a floor/ceiling ring → a projected ring with every
//!   point at or beyond the near plane.
//!
//! “Not visible” is `None` / an empty ring, never an error.

use smallvec::SmallVec;

use super::{
    fixed::Fixed,
    transform::{View, round_px},
    types::{ClipPoint, ScreenPoint},
};

/// Inline ring size: a quad gains at most one point per clip. Larger rings
/// spill to the heap.
pub const MAX_RING: usize = 8;

pub type ClipRing = SmallVec<[ClipPoint; MAX_RING]>;

/// View-space endpoint of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgePoint {
    pub view_x: Fixed,
    pub depth: Fixed,
}

/// Screen x of both endpoints, in input order.
///
/// An endpoint nearer than the near plane is replaced by the point where
/// the edge crosses it, projected and clamped to `[0, width]`.
pub fn clip_edge(view: &View, a: EdgePoint, b: EdgePoint) -> Option<(Fixed, Fixed)> {
    let near = view.near;
    if a.depth <= near && b.depth <= near {
        return None;
    }
    if a.depth > view.far && b.depth > view.far {
        return None;
    }
    let sx_a = match view.project_x(a.view_x, a.depth) {
        Some(x) => x,
        None => crossing_x(view, a, b),
    };
    let sx_b = match view.project_x(b.view_x, b.depth) {
        Some(x) => x,
        None => crossing_x(view, b, a),
    };
    Some((sx_a, sx_b))
}

/// Screen x where the edge from the hidden point `hid` toward `vis`
/// crosses the near plane. Needs `hid.depth <= near < vis.depth`.
fn crossing_x(view: &View, hid: EdgePoint, vis: EdgePoint) -> Fixed {
    debug_assert!(hid.depth <= view.near && vis.depth > view.near);
    let t_num = view.near - hid.depth;
    let t_den = vis.depth - hid.depth;
    let x = hid.view_x + (vis.view_x - hid.view_x).mul_div(t_num, t_den);
    let width = Fixed::from_int(view.tables.width as i32);
    view.screen_x_at(x, view.near).max(Fixed::ZERO).min(width)
}

/// Clip `ring` against the near plane and project the survivors.
pub fn clip_polygon(view: &View, ring: &[ClipPoint]) -> ClipRing {
    let near = view.near;
    let mut out = ClipRing::new();
    if ring.len() < 3 {
        return out;
    }
    for (i, &cur) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        let cur_in = cur.depth >= near;
        let next_in = next.depth >= near;
        if cur_in {
            out.push(cur);
        }
        if cur_in != next_in {
            let t_num = near - cur.depth;
            let t_den = next.depth - cur.depth;
            out.push(ClipPoint::new(
                cur.view_x + (next.view_x - cur.view_x).mul_div(t_num, t_den),
                cur.height + (next.height - cur.height).mul_div(t_num, t_den),
                near,
            ));
        }
    }
    if out.len() < 3 {
        out.clear();
        return out;
    }
    for p in out.iter_mut() {
        p.screen = ScreenPoint {
            x: view.screen_x_at(p.view_x, p.depth),
            y: round_px(view.screen_y_at(p.height, p.depth)),
        };
    }
    out
}

/// Ceiling rings reaching this far below the screen are degenerate.
pub fn exceeds_ceiling_bound(ring: &[ClipPoint], screen_height: usize) -> bool {
    let limit = 2 * screen_height as i32;
    ring.iter().any(|p| p.screen.y > limit)
}
