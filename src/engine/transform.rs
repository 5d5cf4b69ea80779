//! World → view → screen.
//!
//! [`View`] is the per-frame camera snapshot every generator reads;
//! [`VertexArena`] hands out transformed tile corners for one frame.

use super::{
    error::RenderError,
    fixed::Fixed,
    tables::{ProjectionTables, finecosine, finesine},
    types::{Projected, ScanWindow, Vertex},
};
use crate::world::Camera;

/// Camera state and tables shared by one frame's generation pass.
pub struct View<'t> {
    pub x: Fixed,
    pub y: Fixed,
    pub eye_z: Fixed,
    pub angle: u32,
    pub cos: Fixed,
    pub sin: Fixed,
    pub near: Fixed,
    pub far: Fixed,
    /// Frame counter driving rotating textures.
    pub tick: u32,
    pub rows: ScanWindow,
    pub tables: &'t ProjectionTables,
}

impl<'t> View<'t> {
    pub fn new(
        camera: &Camera,
        tables: &'t ProjectionTables,
        near: Fixed,
        far: Fixed,
        tick: u32,
    ) -> Self {
        let angle = camera.angle();
        Self {
            x: camera.x(),
            y: camera.y(),
            eye_z: camera.z(),
            angle,
            cos: finecosine(angle),
            sin: finesine(angle),
            near,
            far,
            tick,
            rows: ScanWindow::full(tables.height),
            tables,
        }
    }

    #[inline]
    pub fn focal(&self) -> Fixed {
        Fixed::from_int(self.tables.focal)
    }

    /// Rotate a world point into view space: `(view_x, depth)`.
    ///
    /// `view_x` grows to the viewer's right.
    #[inline]
    pub fn to_view(&self, x: Fixed, y: Fixed) -> (Fixed, Fixed) {
        let dx = x - self.x;
        let dy = y - self.y;
        let depth = dx * self.cos + dy * self.sin;
        let view_x = dy * self.cos - dx * self.sin;
        (view_x, depth)
    }

    /// Screen x (sub-pixel) of a view-space point beyond the near plane.
    #[inline]
    pub fn project_x(&self, view_x: Fixed, depth: Fixed) -> Option<Fixed> {
        (depth > self.near).then(|| self.screen_x_at(view_x, depth))
    }

    /// Screen y (sub-pixel) of an absolute height seen at `depth`.
    #[inline]
    pub fn project_height(&self, height: Fixed, depth: Fixed) -> Option<Fixed> {
        (depth > self.near).then(|| self.screen_y_at(height - self.eye_z, depth))
    }

    /// Unchecked forms for callers that already clipped to `depth >= near`.
    #[inline]
    pub(crate) fn screen_x_at(&self, view_x: Fixed, depth: Fixed) -> Fixed {
        Fixed::from_int(self.tables.center_x) + view_x.mul_div(self.focal(), depth)
    }

    /// `rel_h` is relative to the eye.
    #[inline]
    pub(crate) fn screen_y_at(&self, rel_h: Fixed, depth: Fixed) -> Fixed {
        Fixed::from_int(self.tables.center_y) - rel_h.mul_div(self.focal(), depth)
    }
}

/// Round a sub-pixel coordinate to the nearest row.
#[inline]
pub fn round_px(v: Fixed) -> i32 {
    (v + Fixed::HALF).floor_int()
}

pub type VertexId = u32;

/// Bounded, frame-local store of transformed corners.
pub struct VertexArena {
    verts: Vec<Vertex>,
    capacity: usize,
}

impl VertexArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            verts: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.verts.clear();
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    #[inline]
    pub fn get(&self, id: VertexId) -> &Vertex {
        &self.verts[id as usize]
    }

    /// Transform the world point `(x, y)` with its two plane heights.
    ///
    /// The screen fields are only filled when the point is strictly beyond
    /// the near plane.
    pub fn transform(
        &mut self,
        view: &View,
        x: Fixed,
        y: Fixed,
        floor_h: Fixed,
        ceiling_h: Fixed,
    ) -> Result<VertexId, RenderError> {
        if self.verts.len() >= self.capacity {
            log::error!("vertex arena overflow at {} vertices", self.capacity);
            return Err(RenderError::VertexArenaFull {
                capacity: self.capacity,
            });
        }
        let (view_x, depth) = view.to_view(x, y);
        let projected = view.project_x(view_x, depth).map(|screen_x| Projected {
            screen_x,
            floor_y: view.screen_y_at(floor_h - view.eye_z, depth),
            ceiling_y: view.screen_y_at(ceiling_h - view.eye_z, depth),
        });
        self.verts.push(Vertex {
            view_x,
            depth,
            floor_h,
            ceiling_h,
            projected,
        });
        Ok((self.verts.len() - 1) as VertexId)
    }
}
