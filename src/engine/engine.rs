use glam::IVec2;
use hecs::World;

use super::{
    context::{FrameBuffers, RenderContext},
    doors::render_door,
    error::RenderError,
    fixed::Fixed,
    overlay::MinimapOverlay,
    planes::render_tile_ends,
    spans::{PostQueue, SpanList},
    sprites::project_sprites,
    tables::ProjectionTables,
    transform::View,
    types::ColumnWindow,
    walls::{WallSurface, render_face, render_step, render_wall},
};
use crate::config::RenderConfig;
use crate::defs::WallFlags;
use crate::renderer::ColumnScaler;
use crate::sim::despawn_expired;
use crate::world::{Camera, DoorAxis, Faces, TileMap, height_to_fixed};

/// One tile handed over by the visibility walker, nearest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileVisit {
    pub tile: IVec2,
    /// Screen columns the tile may draw into.
    pub window: ColumnWindow,
    /// Faces turned toward the camera.
    pub faces: Faces,
}

impl TileVisit {
    /// Every tile whose centre lies within `radius` of the camera, nearest
    /// first, with the full screen as window. No occlusion.
    pub fn all_within(map: &TileMap, camera: &Camera, radius: Fixed, width: usize) -> Vec<Self> {
        let (cx, cy) = (camera.x(), camera.y());
        let mut out: Vec<(i64, TileVisit)> = Vec::new();
        for row in 0..map.rows() as i32 {
            for col in 0..map.cols() as i32 {
                let dx = (Fixed::from_int(col) + Fixed::HALF - cx).raw() as i64;
                let dy = (Fixed::from_int(row) + Fixed::HALF - cy).raw() as i64;
                let r = radius.raw() as i64;
                let d2 = dx * dx + dy * dy;
                if d2 > r * r {
                    continue;
                }
                let tile = IVec2::new(col, row);
                out.push((
                    d2,
                    TileVisit {
                        tile,
                        window: ColumnWindow::full(width),
                        faces: Faces::facing_point(tile, cx, cy),
                    },
                ));
            }
        }
        out.sort_by_key(|(d2, _)| *d2);
        out.into_iter().map(|(_, v)| v).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub tiles: usize,
    pub spans: usize,
    pub posts: usize,
    pub vertices: usize,
    /// Expired objects despawned after the sprite pass.
    pub removed: usize,
}

pub struct SpanEngine {
    config: RenderConfig,
    tables: ProjectionTables,
    buffers: FrameBuffers,
    tick: u32,
}

impl SpanEngine {
    pub fn new(config: RenderConfig) -> Self {
        let tables = ProjectionTables::new(config.width, config.height, config.fov_degrees);
        let buffers = FrameBuffers::new(&config);
        Self {
            config,
            tables,
            buffers,
            tick: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn tables(&self) -> &ProjectionTables {
        &self.tables
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn spans(&self) -> &SpanList {
        &self.buffers.spans
    }

    pub fn posts(&self) -> &PostQueue {
        &self.buffers.posts
    }

    pub fn overlay(&self) -> &MinimapOverlay {
        &self.buffers.overlay
    }

    /// Frames rendered so far; drives rotating walls.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Change the screen size; returns whether the tables were rebuilt.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        self.config.width = width;
        self.config.height = height;
        self.tables.resize(width, height, self.config.fov_degrees)
    }

    /// Generate one frame.
    ///
    /// Opaque wall columns go to `scaler` immediately; everything else is
    /// left in [`spans`](Self::spans) and [`posts`](Self::posts) until the
    /// next call.
    pub fn render_frame<I>(
        &mut self,
        camera: &Camera,
        map: &TileMap,
        world: &mut World,
        visits: I,
        scaler: &mut dyn ColumnScaler,
    ) -> Result<FrameStats, RenderError>
    where
        I: IntoIterator<Item = TileVisit>,
    {
        self.tick = self.tick.wrapping_add(1);
        self.buffers.begin_frame(map.cols(), map.rows());
        let view = View::new(
            camera,
            &self.tables,
            self.config.near_bound(),
            self.config.far_bound(),
            self.tick,
        );

        let mut stats = FrameStats::default();
        let expired = {
            let mut ctx = RenderContext::new(&view, &mut self.buffers);
            for visit in visits {
                stats.tiles += 1;
                render_tile(&mut ctx, map, &visit, scaler)?;
            }
            project_sprites(&mut ctx, map, world)?
        };
        stats.removed = despawn_expired(world, expired);

        stats.spans = self.buffers.spans.len();
        stats.posts = self.buffers.posts.len();
        stats.vertices = self.buffers.vertices.len();
        log::debug!(
            "frame {}: {} tiles, {} spans, {} posts, {} vertices, {} removed",
            self.tick,
            stats.tiles,
            stats.spans,
            stats.posts,
            stats.vertices,
            stats.removed
        );
        Ok(stats)
    }
}

fn render_tile(
    ctx: &mut RenderContext,
    map: &TileMap,
    visit: &TileVisit,
    scaler: &mut dyn ColumnScaler,
) -> Result<(), RenderError> {
    let Some(idx) = map.index(visit.tile) else {
        return Ok(());
    };
    ctx.enter_tile(visit.tile, visit.window, map.shade(idx));
    if ctx.window.is_empty() {
        return Ok(());
    }

    if map.is_solid(idx) {
        log::trace!("wall tile {} faces {:?}", visit.tile, visit.faces);
        let see_through = WallFlags::TRANSLUCENT | WallFlags::DAMAGE_ONLY;
        if map.walls[idx].flags.intersects(see_through) {
            render_tile_ends(ctx, map)?;
        }
        for face in visit.faces.orientations() {
            render_wall(ctx, map, face, scaler)?;
        }
    } else if let Some(id) = map.door_at(idx) {
        log::trace!("door tile {} (door {id})", visit.tile);
        render_tile_ends(ctx, map)?;
        if let Some(door) = map.door(id).filter(|d| d.is_closed()) {
            // a shut door is an ordinary wall face on either side
            let surface = WallSurface {
                texture: map.translate(door.leaf_texture),
                flags: WallFlags::empty(),
                floor_h: height_to_fixed(map.floors[idx].height),
                ceiling_h: height_to_fixed(map.ceilings[idx].height),
            };
            let normal = match door.axis {
                DoorAxis::EastWest => Faces::WEST | Faces::EAST,
                DoorAxis::NorthSouth => Faces::NORTH | Faces::SOUTH,
            };
            for face in (visit.faces & normal).orientations() {
                render_face(ctx, face, &surface, scaler)?;
            }
        }
        render_door(ctx, map, id)?;
    } else {
        log::trace!("open tile {} faces {:?}", visit.tile, visit.faces);
        render_tile_ends(ctx, map)?;
        for face in visit.faces.orientations() {
            render_step(ctx, map, face)?;
        }
    }
    Ok(())
}
