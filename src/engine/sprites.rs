//! Dynamic objects → `Sprite` spans.

use hecs::{Entity, World};

use super::{
    context::RenderContext,
    error::RenderError,
    spans::{FULLBRIGHT, Shade, SpanPayload, SpanRecord},
    tables::{FINEANGLES, FINEMASK, point_to_angle},
    transform::{View, round_px},
};
use crate::defs::ObjectFlags;
use crate::sim::{AnimState, Facing, SpecialType, SpriteState, WorldPos};
use crate::world::TileMap;

/// Directional view (0 = seen from the front) of an object at `pos`
/// heading `facing`, for a sprite with `views` rotations.
pub fn facing_sector(view: &View, pos: &WorldPos, facing: u32, views: u16) -> u16 {
    if views <= 1 {
        return 0;
    }
    let n = views as u32;
    let to_viewer = point_to_angle(view.x - pos.x, view.y - pos.y);
    let half = FINEANGLES as u32 / (2 * n);
    let rel = to_viewer.wrapping_sub(facing).wrapping_add(half) & FINEMASK;
    (rel * n / FINEANGLES as u32) as u16
}

fn sprite_shade(map: &TileMap, pos: &WorldPos, sprite: &SpriteState) -> Shade {
    if sprite.flags.contains(ObjectFlags::NO_CLIP) || sprite.special == SpecialType::Luminous {
        return FULLBRIGHT;
    }
    let tile = glam::IVec2::new(pos.x.floor_int(), pos.y.floor_int());
    map.index(tile).map_or(FULLBRIGHT, |idx| map.shade(idx))
}

/// Append one span per visible object.
///
/// Self-destructing objects whose animation has ended are not projected;
/// they are returned so the caller can despawn them after the pass.
pub fn project_sprites(
    ctx: &mut RenderContext,
    map: &TileMap,
    world: &World,
) -> Result<Vec<Entity>, RenderError> {
    let view = ctx.view;
    let clearance = view.near.scale(2);
    let mut expired = Vec::new();

    let mut query = world.query::<(&WorldPos, &SpriteState, Option<&Facing>, Option<&AnimState>)>();
    for (entity, (pos, sprite, facing, anim)) in query.iter() {
        if anim.is_some_and(AnimState::expired) {
            expired.push(entity);
            continue;
        }
        if (pos.x - view.x).abs() > view.far || (pos.y - view.y).abs() > view.far {
            continue;
        }
        let (view_x, depth) = view.to_view(pos.x, pos.y);
        if depth < clearance || depth > view.far {
            continue;
        }
        let Some(sx) = view.project_x(view_x, depth) else {
            continue;
        };

        let views = sprite.rotation.views();
        let frame = anim.map_or(0, |a| a.frame as u16);
        let sector = facing_sector(view, pos, facing.map_or(0, |f| f.0), views);
        let picture = sprite
            .base_picture
            .wrapping_add(frame * views)
            .wrapping_add(sector);

        ctx.buffers.spans.push(SpanRecord {
            depth,
            shade: sprite_shade(map, pos, sprite),
            payload: SpanPayload::Sprite {
                entity,
                picture,
                screen_x: round_px(sx),
                view_x,
                z_offset: pos.z - view.eye_z,
            },
        })?;
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::engine::context::FrameBuffers;
    use crate::engine::fixed::Fixed;
    use crate::engine::tables::{ANG90, ANG180, ProjectionTables};
    use crate::sim::{Rotation, spawn_sprite};
    use crate::world::Camera;

    struct Rig {
        cfg: RenderConfig,
        tables: ProjectionTables,
        map: TileMap,
        world: World,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = RenderConfig::default();
            let mut map = TileMap::new(8, 8, 1, 2);
            map.set_light(glam::IVec2::new(1, 5), 77, 0).unwrap();
            Self {
                tables: ProjectionTables::new(cfg.width, cfg.height, cfg.fov_degrees),
                cfg,
                map,
                world: World::new(),
            }
        }

        fn spawn(&mut self, x: f32, y: f32, sprite: SpriteState, facing: u32, anim: AnimState) -> Entity {
            spawn_sprite(&mut self.world, WorldPos::new(x, y, 0.25), Facing(facing), sprite, anim)
        }

        /// Camera at (1.5, 1.5) looking toward +y.
        fn project(&self) -> (Vec<SpanRecord>, Vec<Entity>) {
            let cam = Camera::at(1.5, 1.5, 0.5, ANG90);
            let view = View::new(&cam, &self.tables, self.cfg.near_bound(), self.cfg.far_bound(), 0);
            let mut buffers = FrameBuffers::new(&self.cfg);
            let expired = {
                let mut ctx = RenderContext::new(&view, &mut buffers);
                project_sprites(&mut ctx, &self.map, &self.world).unwrap()
            };
            (buffers.spans.records().to_vec(), expired)
        }
    }

    fn payload(rec: &SpanRecord) -> (u16, i32, Fixed) {
        match rec.payload {
            SpanPayload::Sprite {
                picture,
                screen_x,
                z_offset,
                ..
            } => (picture, screen_x, z_offset),
            _ => unreachable!(),
        }
    }

    #[test]
    fn object_ahead_is_projected() {
        let mut rig = Rig::new();
        rig.spawn(1.5, 5.5, SpriteState::default(), 0, AnimState::default());
        let (spans, expired) = rig.project();
        assert!(expired.is_empty());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].depth, Fixed::from_int(4));
        assert_eq!(spans[0].shade, Shade::Light(77));
        let (_, screen_x, z_offset) = payload(&spans[0]);
        assert_eq!(screen_x, 160);
        assert_eq!(z_offset, -Fixed::from_f32(0.25));
    }

    #[test]
    fn far_on_x_axis_alone_is_culled() {
        let mut rig = Rig::new();
        let far = rig.cfg.far;
        rig.spawn(1.5 + far + 1.0, 3.5, SpriteState::default(), 0, AnimState::default());
        let (spans, _) = rig.project();
        assert!(spans.is_empty());
    }

    #[test]
    fn too_close_or_behind_is_culled() {
        let mut rig = Rig::new();
        rig.spawn(1.5, 1.6, SpriteState::default(), 0, AnimState::default());
        rig.spawn(1.5, 0.5, SpriteState::default(), 0, AnimState::default());
        assert!(rig.project().0.is_empty());
    }

    #[test]
    fn picture_follows_frame_and_facing() {
        let four = SpriteState {
            base_picture: 10,
            rotation: Rotation::Four,
            ..SpriteState::default()
        };
        let mut anim = AnimState::new(4, 3, true);
        anim.frame = 2;
        // object faces -y, toward the camera
        let mut rig = Rig::new();
        rig.spawn(1.5, 5.5, four, ANG90 + ANG180, anim);
        assert_eq!(payload(&rig.project().0[0]).0, 10 + 2 * 4);

        // object faces away
        let mut rig = Rig::new();
        rig.spawn(1.5, 5.5, four, ANG90, anim);
        assert_eq!(payload(&rig.project().0[0]).0, 10 + 2 * 4 + 2);
    }

    #[test]
    fn luminous_and_noclip_are_fullbright() {
        let mut rig = Rig::new();
        let lamp = SpriteState {
            special: SpecialType::Luminous,
            ..SpriteState::default()
        };
        let ghost = SpriteState {
            flags: ObjectFlags::NO_CLIP,
            ..SpriteState::default()
        };
        rig.spawn(1.5, 5.5, lamp, 0, AnimState::default());
        rig.spawn(2.5, 5.5, ghost, 0, AnimState::default());
        let (spans, _) = rig.project();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|r| r.shade == FULLBRIGHT));
    }

    #[test]
    fn expired_objects_are_reported_not_drawn() {
        let mut rig = Rig::new();
        let mut puff = AnimState::one_shot(1, 1);
        puff.tick();
        let e = rig.spawn(1.5, 5.5, SpriteState::default(), 0, puff);
        let (spans, expired) = rig.project();
        assert!(spans.is_empty());
        assert_eq!(expired, vec![e]);
    }
}
