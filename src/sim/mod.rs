mod components;
mod systems;

pub use components::{AnimState, Facing, Rotation, SpecialType, SpriteState, WorldPos};
pub use systems::{animation, despawn_expired, spawn_sprite};
