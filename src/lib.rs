//! Span generation for a tile-grid pseudo-3D renderer.
//!
//! Each frame a [`SpanEngine`](engine::SpanEngine) turns the camera, the
//! [`TileMap`](world::TileMap), the `hecs` object world and the walker's
//! tile visits into depth-keyed spans plus a queue of pending posts.
//! Opaque wall columns bypass the list and go straight to a
//! [`ColumnScaler`](renderer::ColumnScaler).

pub mod config;
pub mod defs;
pub mod engine;
pub mod renderer;
pub mod sim;
pub mod world;
