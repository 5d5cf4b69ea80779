use super::fixed::Fixed;

/// Half-open range of screen columns `[left, right)` a tile may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnWindow {
    pub left: i32,
    pub right: i32,
}

impl ColumnWindow {
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    pub const fn full(width: usize) -> Self {
        Self {
            left: 0,
            right: width as i32,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.left >= self.right
    }

    /// Intersect with `[0, width)`.
    pub fn clamp_to(self, width: usize) -> Self {
        Self {
            left: self.left.max(0),
            right: self.right.min(width as i32),
        }
    }
}

/// Half-open range of screen rows `[top, bottom)` the rasterizer may emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanWindow {
    pub top: i32,
    pub bottom: i32,
}

impl ScanWindow {
    pub const fn full(height: usize) -> Self {
        Self {
            top: 0,
            bottom: height as i32,
        }
    }
}

/// Sub-pixel x, whole-pixel y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: Fixed,
    pub y: i32,
}

/// Screen placement of a vertex; only exists in front of the near plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projected {
    pub screen_x: Fixed,
    pub floor_y: Fixed,
    pub ceiling_y: Fixed,
}

/// A tile corner in view space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub view_x: Fixed,
    pub depth: Fixed,
    pub floor_h: Fixed,
    pub ceiling_h: Fixed,
    pub(crate) projected: Option<Projected>,
}

impl Vertex {
    /// `None` when the vertex sits at or behind the near plane.
    #[inline]
    pub fn projected(&self) -> Option<&Projected> {
        self.projected.as_ref()
    }
}

/// One corner of a polygon being clipped and rasterized.
///
/// `height` is relative to the eye; `screen` is filled in by the clipper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipPoint {
    pub view_x: Fixed,
    pub height: Fixed,
    pub depth: Fixed,
    pub screen: ScreenPoint,
}

impl ClipPoint {
    pub const fn new(view_x: Fixed, height: Fixed, depth: Fixed) -> Self {
        Self {
            view_x,
            height,
            depth,
            screen: ScreenPoint {
                x: Fixed::ZERO,
                y: 0,
            },
        }
    }
}
