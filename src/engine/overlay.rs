//! Minimap edge markers written as a by-product of wall and door output.
//!
//! `north` holds the horizontal edges (`y = line`, `rows + 1` lines of
//! `cols` edges), `west` the vertical ones (`rows` rows of `cols + 1`).

use glam::IVec2;

use crate::world::Orientation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Marker {
    #[default]
    Empty = 0,
    Wall = 1,
    Translucent = 2,
    Door = 3,
}

pub struct MinimapOverlay {
    cols: usize,
    rows: usize,
    north: Vec<Marker>,
    west: Vec<Marker>,
}

impl MinimapOverlay {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            north: vec![Marker::Empty; (rows + 1) * cols],
            west: vec![Marker::Empty; rows * (cols + 1)],
        }
    }

    /// Resize (if needed) and wipe every marker.
    pub fn reset(&mut self, cols: usize, rows: usize) {
        if cols != self.cols || rows != self.rows {
            *self = Self::new(cols, rows);
        } else {
            self.north.fill(Marker::Empty);
            self.west.fill(Marker::Empty);
        }
    }

    pub fn mark(&mut self, tile: IVec2, face: Orientation, marker: Marker) {
        if tile.x < 0 || tile.y < 0 {
            return;
        }
        let (c, r) = (tile.x as usize, tile.y as usize);
        if c >= self.cols || r >= self.rows {
            return;
        }
        let slot = match face {
            Orientation::North => self.north.get_mut(r * self.cols + c),
            Orientation::South => self.north.get_mut((r + 1) * self.cols + c),
            Orientation::West => self.west.get_mut(r * (self.cols + 1) + c),
            Orientation::East => self.west.get_mut(r * (self.cols + 1) + c + 1),
        };
        if let Some(m) = slot {
            *m = marker;
        }
    }

    /// Marker on the horizontal edge `y = line` above column `col`.
    pub fn north(&self, col: usize, line: usize) -> Marker {
        self.north
            .get(line * self.cols + col)
            .copied()
            .unwrap_or_default()
    }

    /// Marker on the vertical edge `x = line` beside row `row`.
    pub fn west(&self, line: usize, row: usize) -> Marker {
        self.west
            .get(row * (self.cols + 1) + line)
            .copied()
            .unwrap_or_default()
    }

    pub fn north_edges(&self) -> &[Marker] {
        &self.north
    }

    pub fn west_edges(&self) -> &[Marker] {
        &self.west
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_map_to_shared_edges() {
        let mut ov = MinimapOverlay::new(4, 3);
        let t = IVec2::new(1, 1);
        ov.mark(t, Orientation::South, Marker::Wall);
        ov.mark(t, Orientation::East, Marker::Translucent);
        // south face of (1,1) is the north face of (1,2)
        assert_eq!(ov.north(1, 2), Marker::Wall);
        assert_eq!(ov.west(2, 1), Marker::Translucent);
        assert_eq!(ov.north(1, 1), Marker::Empty);

        ov.mark(IVec2::new(9, 0), Orientation::North, Marker::Door);
        assert!(ov.north_edges().iter().all(|&m| m != Marker::Door));
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut ov = MinimapOverlay::new(2, 2);
        ov.mark(IVec2::ZERO, Orientation::West, Marker::Door);
        ov.reset(2, 2);
        assert_eq!(ov.west(0, 0), Marker::Empty);
        ov.reset(3, 5);
        assert_eq!(ov.north_edges().len(), 6 * 3);
        assert_eq!(ov.west_edges().len(), 5 * 4);
    }
}
