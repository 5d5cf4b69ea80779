//! Pixel back-ends.
//!
//! The span generator never touches a frame buffer. Opaque wall columns
//! are handed to a [`ColumnScaler`] the moment they are generated;
//! everything else waits in the span list for a compositor.
//!
//! * [`Software`] scales posts into an 8-bit indexed buffer.
//! * `Vec<PostDraw>` just records the requests, which is what tests use.

use crate::engine::spans::PostDraw;

/// The external pixel-scaling routine for opaque wall columns.
pub trait ColumnScaler {
    fn scale_post(&mut self, post: &PostDraw);
}

impl ColumnScaler for Vec<PostDraw> {
    fn scale_post(&mut self, post: &PostDraw) {
        self.push(*post);
    }
}

pub mod software;

pub use software::Software;
