use hecs::{Entity, World};

use super::components::{AnimState, Facing, SpriteState, WorldPos};

/* ── Spawning ─────────────────────────────────────────────────────── */

pub fn spawn_sprite(
    world: &mut World,
    pos: WorldPos,
    facing: Facing,
    sprite: SpriteState,
    anim: AnimState,
) -> Entity {
    world.spawn((pos, facing, sprite, anim))
}

/* ── Animation system ─────────────────────────────────────────────── */

/// Advance every animation by one game tic.
pub fn animation(world: &mut World) {
    for (_, anim) in world.query_mut::<&mut AnimState>() {
        anim.tick();
    }
}

/// Remove objects collected as expired during a frame; returns how many
/// were still alive to be removed.
pub fn despawn_expired<I>(world: &mut World, expired: I) -> usize
where
    I: IntoIterator<Item = Entity>,
{
    expired
        .into_iter()
        .filter(|&e| world.despawn(e).is_ok())
        .count()
}
