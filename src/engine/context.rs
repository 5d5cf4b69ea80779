use glam::IVec2;

use super::{
    overlay::MinimapOverlay,
    spans::{FULLBRIGHT, PostQueue, Shade, SpanList},
    transform::{VertexArena, View},
    types::ColumnWindow,
};
use crate::config::RenderConfig;

/// Every buffer that lives for exactly one frame.
pub struct FrameBuffers {
    pub vertices: VertexArena,
    pub spans: SpanList,
    pub posts: PostQueue,
    pub overlay: MinimapOverlay,
}

impl FrameBuffers {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            vertices: VertexArena::new(config.max_vertices),
            spans: SpanList::new(config.max_spans),
            posts: PostQueue::new(config.max_posts),
            overlay: MinimapOverlay::new(0, 0),
        }
    }

    /// Empty everything; the overlay is sized for a `cols × rows` map.
    pub fn begin_frame(&mut self, cols: usize, rows: usize) {
        self.vertices.clear();
        self.spans.clear();
        self.posts.clear();
        self.overlay.reset(cols, rows);
    }
}

/// What every generator needs to know about the tile being rendered.
pub struct RenderContext<'a> {
    pub view: &'a View<'a>,
    pub buffers: &'a mut FrameBuffers,
    pub tile: IVec2,
    pub window: ColumnWindow,
    pub shade: Shade,
}

impl<'a> RenderContext<'a> {
    pub fn new(view: &'a View<'a>, buffers: &'a mut FrameBuffers) -> Self {
        let window = ColumnWindow::full(view.tables.width);
        Self {
            view,
            buffers,
            tile: IVec2::ZERO,
            window,
            shade: FULLBRIGHT,
        }
    }

    pub fn enter_tile(&mut self, tile: IVec2, window: ColumnWindow, shade: Shade) {
        self.tile = tile;
        self.window = window.clamp_to(self.view.tables.width);
        self.shade = shade;
    }
}
