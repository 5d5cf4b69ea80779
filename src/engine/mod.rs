pub mod clip;
pub mod context;
pub mod doors;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod error;
pub mod fixed;
pub mod overlay;
pub mod planes;
pub mod spans;
pub mod sprites;
pub mod tables;
pub mod transform;
pub mod trapezoid;
pub mod types;
pub mod walls;

pub use context::{FrameBuffers, RenderContext};
pub use doors::DoorPart;
pub use engine::{FrameStats, SpanEngine, TileVisit};
pub use error::RenderError;
pub use fixed::{FRACBITS, FRACUNIT, Fixed};
pub use overlay::{Marker, MinimapOverlay};
pub use spans::{
    FULLBRIGHT, PostDraw, PostIndex, PostQueue, PostRef, Shade, SortKey, SpanKind, SpanList,
    SpanPayload, SpanRecord,
};
pub use tables::ProjectionTables;
pub use transform::View;
pub use types::ColumnWindow;
