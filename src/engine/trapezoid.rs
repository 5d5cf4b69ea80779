//! Convex polygon → per-scanline intervals.
//!
//! Two edge walkers start at the topmost vertex: the left one steps to the
//! previous vertex, the right one to the next, so a clockwise ring (screen
//! y down) has left ≤ right on every row. A ring wound the other way ends
//! up with the walkers crossed and emits nothing.

use super::{
    error::RenderError,
    fixed::Fixed,
    types::{ColumnWindow, ScanWindow, ScreenPoint},
};

#[derive(Clone, Copy)]
enum Dir {
    Prev,
    Next,
}

/// One polygon edge being walked downward.
struct Walker {
    vertex: usize,
    x: Fixed,
    step: Fixed,
    end_y: i32,
}

impl Walker {
    fn start(vertex: usize) -> Self {
        Self {
            vertex,
            x: Fixed::ZERO,
            step: Fixed::ZERO,
            end_y: i32::MIN,
        }
    }

    /// Move onto the next descending edge, skipping horizontal ones.
    ///
    /// `consumed` counts edges taken by both walkers; once every edge has
    /// been used the polygon is exhausted.
    fn advance(&mut self, poly: &[ScreenPoint], dir: Dir, consumed: &mut usize) -> bool {
        let n = poly.len();
        loop {
            if *consumed >= n {
                return false;
            }
            let next = match dir {
                Dir::Prev => (self.vertex + n - 1) % n,
                Dir::Next => (self.vertex + 1) % n,
            };
            let (a, b) = (poly[self.vertex], poly[next]);
            *consumed += 1;
            self.vertex = next;
            if b.y > a.y {
                let dy = b.y - a.y;
                self.x = a.x;
                self.step = Fixed::from_raw((b.x.raw() - a.x.raw()) / dy);
                self.end_y = b.y;
                return true;
            }
            if b.y < a.y {
                return false;
            }
        }
    }
}

/// Walk `poly` top to bottom and call `emit(row, x1, x2)` for every
/// non-empty interval `[x1, x2)` inside `rows` × `cols`.
pub fn rasterize<F>(
    poly: &[ScreenPoint],
    rows: ScanWindow,
    cols: ColumnWindow,
    mut emit: F,
) -> Result<(), RenderError>
where
    F: FnMut(i32, i32, i32) -> Result<(), RenderError>,
{
    let n = poly.len();
    if n < 3 {
        return Ok(());
    }
    let mut top = 0;
    let mut bottom_y = poly[0].y;
    for (i, p) in poly.iter().enumerate().skip(1) {
        if p.y < poly[top].y {
            top = i;
        }
        bottom_y = bottom_y.max(p.y);
    }

    let mut consumed = 0;
    let mut left = Walker::start(top);
    let mut right = Walker::start(top);
    if !left.advance(poly, Dir::Prev, &mut consumed)
        || !right.advance(poly, Dir::Next, &mut consumed)
    {
        return Ok(());
    }

    let mut y = poly[top].y;
    let last = bottom_y.min(rows.bottom);
    while y < last {
        if y >= left.end_y && !left.advance(poly, Dir::Prev, &mut consumed) {
            break;
        }
        if y >= right.end_y && !right.advance(poly, Dir::Next, &mut consumed) {
            break;
        }
        if y >= rows.top {
            let x1 = left.x.ceil_int().max(cols.left);
            let x2 = right.x.ceil_int().min(cols.right);
            if x1 < x2 {
                emit(y, x1, x2)?;
            }
        }
        left.x += left.step;
        right.x += right.step;
        y += 1;
    }
    Ok(())
}
