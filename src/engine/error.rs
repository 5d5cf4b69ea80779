/// Hard failures of the span generator.
///
/// Every variant means a frame-local buffer ran out of room; the frame is
/// abandoned and the buffer that overflowed keeps what it already held.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("vertex arena exhausted (capacity {capacity})")]
    VertexArenaFull { capacity: usize },

    #[error("span list full (capacity {capacity})")]
    SpanListFull { capacity: usize },

    #[error("pending post queue full (capacity {capacity})")]
    PostQueueFull { capacity: usize },
}
