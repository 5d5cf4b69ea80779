//! Wall, step and (via [`column_loop`]) door columns.
//!
//! A face is handled as an infinite plane seen from one side:
//! * `dist`  – perpendicular distance from the camera to the plane,
//! * `basis` – texture coordinate of the camera's foot point on the plane,
//! * `base_angle` – the view angle that looks straight at the face.
//!
//! Per column the ray angle relative to `base_angle` gives the depth
//! (`dist / cos α`, corrected by the column's own cosine) and the texture
//! coordinate (`basis + dist·tan α`).

use glam::IVec2;

use super::{
    clip::{EdgePoint, clip_edge},
    context::RenderContext,
    error::RenderError,
    fixed::{FRACUNIT, Fixed},
    overlay::Marker,
    spans::{PostDraw, PostRef, Shade, SpanPayload, SpanRecord},
    tables::{ANG90, ANG180, ANG270, FINEMASK, finecosine, finetangent},
    transform::View,
    types::ColumnWindow,
};
use crate::defs::WallFlags;
use crate::renderer::ColumnScaler;
use crate::world::{Orientation, TEXTURE_SIZE, TextureId, TileMap, height_to_fixed};

/// Columns whose ray meets the plane at less than this cosine are skipped.
pub const MIN_RAY_COS: Fixed = Fixed::from_raw(FRACUNIT / 64);

/*──────────────────────── wall plane ───────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallPlane {
    /// Side the plane is seen from.
    pub face: Orientation,
    /// x (West/East) or y (North/South) of the plane.
    pub line: Fixed,
    /// Where the one-tile span starts along the other axis.
    pub start: Fixed,
    pub base_angle: u32,
    pub dist: Fixed,
    pub basis: Fixed,
}

impl WallPlane {
    pub fn new(view: &View, face: Orientation, line: Fixed, start: Fixed) -> Self {
        let end = start + Fixed::ONE;
        let (base_angle, dist, basis) = match face {
            Orientation::West => (0, line - view.x, view.y - start),
            Orientation::East => (ANG180, view.x - line, end - view.y),
            Orientation::North => (ANG90, line - view.y, end - view.x),
            Orientation::South => (ANG270, view.y - line, view.x - start),
        };
        Self {
            face,
            line,
            start,
            base_angle,
            dist,
            basis,
        }
    }

    /// The face of `tile` named `face`.
    pub fn for_face(view: &View, tile: IVec2, face: Orientation) -> Self {
        let (c, r) = (Fixed::from_int(tile.x), Fixed::from_int(tile.y));
        let one = Fixed::ONE;
        match face {
            Orientation::North => Self::new(view, face, r, c),
            Orientation::South => Self::new(view, face, r + one, c),
            Orientation::West => Self::new(view, face, c, r),
            Orientation::East => Self::new(view, face, c + one, r),
        }
    }

    /// Camera is on the outer side.
    #[inline]
    pub fn visible(&self) -> bool {
        self.dist > Fixed::ZERO
    }

    /// Texture coordinate of the world offset `s` along the span.
    #[inline]
    pub fn u_of(&self, s: Fixed) -> Fixed {
        match self.face {
            Orientation::West | Orientation::South => s,
            Orientation::East | Orientation::North => Fixed::ONE - s,
        }
    }

    /// World point at texture coordinate `u`.
    pub fn point_at(&self, u: Fixed) -> (Fixed, Fixed) {
        // u_of is its own inverse
        let s = self.start + self.u_of(u);
        match self.face {
            Orientation::West | Orientation::East => (self.line, s),
            Orientation::North | Orientation::South => (s, self.line),
        }
    }

    /// Screen columns `[x1, x2)` covered by texture range `[u_lo, u_hi)`,
    /// clipped to the near plane and `window`.
    pub fn screen_extent(
        &self,
        view: &View,
        window: ColumnWindow,
        u_lo: Fixed,
        u_hi: Fixed,
    ) -> Option<(i32, i32)> {
        let edge = |u| {
            let (x, y) = self.point_at(u);
            let (view_x, depth) = view.to_view(x, y);
            EdgePoint { view_x, depth }
        };
        let (a, b) = clip_edge(view, edge(u_lo), edge(u_hi))?;
        let x1 = a.min(b).ceil_int().max(window.left);
        let x2 = a.max(b).ceil_int().min(window.right);
        (x1 < x2).then_some((x1, x2))
    }
}

/*──────────────────────── column loop ──────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallColumn {
    pub x: i32,
    pub depth: Fixed,
    /// Texture coordinate in tiles from the face's left end.
    pub u: Fixed,
    /// Absolute fine angle of the column's ray.
    pub angle: u32,
}

/// Walk columns `[x1, x2)` of `plane`, calling `emit` for each usable one.
///
/// Only columns whose coordinate falls in `[u_lo, u_hi)` are emitted; the
/// first column is clamped into that range instead. With `far_stops` a
/// column beyond the far bound ends the walk and `Ok(false)` is returned.
#[allow(clippy::too_many_arguments)]
pub fn column_loop<F>(
    view: &View,
    plane: &WallPlane,
    x1: i32,
    x2: i32,
    u_lo: Fixed,
    u_hi: Fixed,
    far_stops: bool,
    mut emit: F,
) -> Result<bool, RenderError>
where
    F: FnMut(WallColumn) -> Result<(), RenderError>,
{
    let t = view.tables;
    for x in x1.max(0)..x2.min(t.width as i32) {
        let col = x as usize;
        let angle = view.angle.wrapping_add_signed(t.pixel_angle[col]) & FINEMASK;
        let alpha = angle.wrapping_sub(plane.base_angle) & FINEMASK;
        let cos_a = finecosine(alpha);
        if cos_a < MIN_RAY_COS {
            continue;
        }
        let depth = plane.dist.mul_div(t.ray_cos[col], cos_a);
        if depth < view.near {
            continue;
        }
        if depth > view.far {
            if far_stops {
                return Ok(false);
            }
            continue;
        }
        let mut u = plane.basis + plane.dist * finetangent(alpha);
        if x == x1 {
            u = u.max(u_lo).min(u_hi - Fixed::from_raw(1));
        } else if u < u_lo || u >= u_hi {
            continue;
        }
        emit(WallColumn { x, depth, u, angle })?;
    }
    Ok(true)
}

/// Post index of texture coordinate `u`, scrolled by `rotation` posts.
#[inline]
pub fn post_index(u: Fixed, rotation: i32) -> u8 {
    ((u.raw() >> 10) + rotation).rem_euclid(TEXTURE_SIZE as i32) as u8
}

/// Sky posts follow the ray angle, wrapping once per turn.
#[inline]
fn sky_post(angle: u32) -> u8 {
    ((angle >> 7) as usize % TEXTURE_SIZE) as u8
}

/// Screen placement of a column spanning absolute heights
/// `bottom_h ..= top_h` at `depth`, clipped to the scan window.
pub fn scaled_post(
    view: &View,
    column: i32,
    top_h: Fixed,
    bottom_h: Fixed,
    depth: Fixed,
    source: PostRef,
    shade: Shade,
) -> Option<PostDraw> {
    let top = view.screen_y_at(top_h - view.eye_z, depth);
    let bottom = view.screen_y_at(bottom_h - view.eye_z, depth);
    let y0 = top.ceil_int().max(view.rows.top);
    let y1 = bottom.ceil_int().min(view.rows.bottom);
    if y0 >= y1 {
        return None;
    }
    let step_raw = depth.raw() as i64 * TEXTURE_SIZE as i64 / view.tables.focal as i64;
    let tex_step = Fixed::from_raw(step_raw.min(i32::MAX as i64) as i32);
    Some(PostDraw {
        column,
        top: y0,
        count: y1 - y0,
        source,
        shade,
        tex_start: (Fixed::from_int(y0) - top) * tex_step,
        tex_step,
    })
}

/*──────────────────────── walls ────────────────────────────────*/

/// Everything about a wall face the column loop needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallSurface {
    pub texture: TextureId,
    pub flags: WallFlags,
    pub floor_h: Fixed,
    pub ceiling_h: Fixed,
}

impl WallSurface {
    pub fn of_tile(map: &TileMap, idx: usize) -> Self {
        let attr = map.walls[idx];
        Self {
            texture: map.translate(attr.texture),
            flags: attr.flags,
            floor_h: height_to_fixed(map.floors[idx].height),
            ceiling_h: height_to_fixed(map.ceilings[idx].height),
        }
    }
}

/// Face `face` of the current (solid) tile.
pub fn render_wall(
    ctx: &mut RenderContext,
    map: &TileMap,
    face: Orientation,
    scaler: &mut dyn ColumnScaler,
) -> Result<(), RenderError> {
    let Some(idx) = map.index(ctx.tile) else {
        return Ok(());
    };
    render_face(ctx, face, &WallSurface::of_tile(map, idx), scaler)
}

/// Opaque faces go straight to `scaler`; the other kinds are queued.
pub fn render_face(
    ctx: &mut RenderContext,
    face: Orientation,
    surface: &WallSurface,
    scaler: &mut dyn ColumnScaler,
) -> Result<(), RenderError> {
    let view = ctx.view;
    let plane = WallPlane::for_face(view, ctx.tile, face);
    if !plane.visible() {
        return Ok(());
    }
    let Some((x1, x2)) = plane.screen_extent(view, ctx.window, Fixed::ZERO, Fixed::ONE) else {
        return Ok(());
    };

    let flags = surface.flags;
    let see_through = flags.intersects(WallFlags::TRANSLUCENT | WallFlags::DAMAGE_ONLY);
    let marker = if see_through {
        Marker::Translucent
    } else {
        Marker::Wall
    };
    ctx.buffers.overlay.mark(ctx.tile, face, marker);

    let rotation = if flags.contains(WallFlags::ROTATING) {
        (view.tick % TEXTURE_SIZE as u32) as i32
    } else {
        0
    };
    let shade = ctx.shade;

    column_loop(view, &plane, x1, x2, Fixed::ZERO, Fixed::ONE, false, |col| {
        let post = if flags.contains(WallFlags::SKY) {
            sky_post(col.angle)
        } else {
            post_index(col.u, rotation)
        };
        let source = PostRef {
            texture: surface.texture,
            post,
        };
        let Some(draw) = scaled_post(
            view,
            col.x,
            surface.ceiling_h,
            surface.floor_h,
            col.depth,
            source,
            shade,
        ) else {
            return Ok(());
        };

        let column = col.x;
        let payload = |post| {
            if flags.contains(WallFlags::SKY) {
                Some(SpanPayload::SkyColumn { column, post })
            } else if flags.contains(WallFlags::DAMAGE_ONLY) {
                Some(SpanPayload::InvisibleWall { column, post })
            } else if flags.contains(WallFlags::TRANSLUCENT) {
                Some(SpanPayload::TranslucentWall { column, post })
            } else {
                None
            }
        };
        if payload(0).is_none() {
            scaler.scale_post(&draw);
            return Ok(());
        }
        let post = ctx.buffers.posts.push(draw)?;
        if let Some(payload) = payload(post) {
            ctx.buffers.spans.push(SpanRecord {
                depth: col.depth,
                shade,
                payload,
            })?;
        }
        Ok(())
    })?;
    Ok(())
}

/*──────────────────────── steps ────────────────────────────────*/

/// Risers on face `face` of the current open tile toward a neighbour with
/// a lower floor or a higher ceiling.
pub fn render_step(
    ctx: &mut RenderContext,
    map: &TileMap,
    face: Orientation,
) -> Result<(), RenderError> {
    let (Some(idx), Some(nidx)) = (map.index(ctx.tile), map.index(ctx.tile + face.offset())) else {
        return Ok(());
    };
    if map.is_solid(nidx) {
        return Ok(());
    }
    let floor = height_to_fixed(map.floors[idx].height);
    let n_floor = height_to_fixed(map.floors[nidx].height);
    if n_floor < floor {
        let tex = map.translate(map.floors[idx].texture);
        step_columns(ctx, face, floor, n_floor, tex)?;
    }
    let ceiling = height_to_fixed(map.ceilings[idx].height);
    let n_ceiling = height_to_fixed(map.ceilings[nidx].height);
    if n_ceiling > ceiling {
        let tex = map.translate(map.ceilings[idx].texture);
        step_columns(ctx, face, n_ceiling, ceiling, tex)?;
    }
    Ok(())
}

fn step_columns(
    ctx: &mut RenderContext,
    face: Orientation,
    top_h: Fixed,
    bottom_h: Fixed,
    texture: TextureId,
) -> Result<(), RenderError> {
    let view = ctx.view;
    let plane = WallPlane::for_face(view, ctx.tile, face);
    if !plane.visible() {
        return Ok(());
    }
    let Some((x1, x2)) = plane.screen_extent(view, ctx.window, Fixed::ZERO, Fixed::ONE) else {
        return Ok(());
    };
    let shade = ctx.shade;
    column_loop(view, &plane, x1, x2, Fixed::ZERO, Fixed::ONE, false, |col| {
        let source = PostRef {
            texture,
            post: post_index(col.u, 0),
        };
        let Some(draw) = scaled_post(view, col.x, top_h, bottom_h, col.depth, source, shade) else {
            return Ok(());
        };
        let post = ctx.buffers.posts.push(draw)?;
        ctx.buffers.spans.push(SpanRecord {
            depth: col.depth,
            shade,
            payload: SpanPayload::Step {
                column: col.x,
                post,
            },
        })?;
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::engine::context::FrameBuffers;
    use crate::engine::spans::SpanKind;
    use crate::engine::tables::ProjectionTables;
    use crate::world::{Camera, PlaneAttr, WallAttr};

    #[test]
    fn post_index_wraps_into_range() {
        assert_eq!(post_index(Fixed::ZERO, 0), 0);
        assert_eq!(post_index(Fixed::HALF, 0), 32);
        assert_eq!(post_index(Fixed::from_raw(-1), 0), 63);
        assert_eq!(post_index(-Fixed::from_int(3), 0), 0);
        assert_eq!(post_index(Fixed::from_raw(-1025), 0), 62);
        assert_eq!(post_index(Fixed::HALF, 200), 40);
        assert_eq!(post_index(Fixed::HALF, -70), 26);
        for raw in (-300_000..300_000).step_by(977) {
            for rot in [0, 63, 64, 65, 1000, -1000] {
                assert!(post_index(Fixed::from_raw(raw), rot) < 64);
            }
        }
    }

    struct Scene {
        map: TileMap,
        tables: ProjectionTables,
        buffers: FrameBuffers,
        cfg: RenderConfig,
    }

    impl Scene {
        fn new() -> Self {
            let cfg = RenderConfig::default();
            Self {
                map: TileMap::new(5, 5, 1, 2),
                tables: ProjectionTables::new(cfg.width, cfg.height, cfg.fov_degrees),
                buffers: FrameBuffers::new(&cfg),
                cfg,
            }
        }

        fn wall(mut self, tile: IVec2, flags: WallFlags) -> Self {
            self.map.set_wall(tile, WallAttr { texture: 7, flags }).unwrap();
            self
        }

        /// Camera at (2.5, 4.5) looking north; renders `face` of `tile`.
        fn render(&mut self, tile: IVec2, face: Orientation, tick: u32) -> Vec<PostDraw> {
            let cam = Camera::at(2.5, 4.5, 0.5, ANG270);
            let view = View::new(&cam, &self.tables, self.cfg.near_bound(), self.cfg.far_bound(), tick);
            self.buffers.begin_frame(5, 5);
            let mut ctx = RenderContext::new(&view, &mut self.buffers);
            let shade = self.map.shade(self.map.index(tile).unwrap());
            ctx.enter_tile(tile, ColumnWindow::full(320), shade);
            let mut drawn: Vec<PostDraw> = Vec::new();
            if self.map.is_solid(self.map.index(tile).unwrap()) {
                render_wall(&mut ctx, &self.map, face, &mut drawn).unwrap();
            } else {
                render_step(&mut ctx, &self.map, face).unwrap();
            }
            drawn
        }
    }

    #[test]
    fn opaque_wall_goes_to_scaler() {
        let tile = IVec2::new(2, 1);
        let mut s = Scene::new().wall(tile, WallFlags::empty());
        let drawn = s.render(tile, Orientation::South, 0);

        assert_eq!(drawn.len(), 64);
        assert_eq!(drawn.first().map(|p| p.column), Some(128));
        assert_eq!(drawn.last().map(|p| p.column), Some(191));
        assert!(s.buffers.spans.is_empty());

        let mid = drawn.iter().find(|p| p.column == 160).unwrap();
        assert_eq!(mid.source, PostRef { texture: 7, post: 32 });
        assert_eq!((mid.top, mid.count), (68, 64));
        assert_eq!(mid.tex_step, Fixed::ONE);
        assert_eq!(s.buffers.overlay.north(2, 2), Marker::Wall);
    }

    #[test]
    fn back_face_is_not_drawn() {
        let tile = IVec2::new(2, 1);
        let mut s = Scene::new().wall(tile, WallFlags::empty());
        assert!(s.render(tile, Orientation::North, 0).is_empty());
    }

    #[test]
    fn rotating_wall_scrolls_posts() {
        let tile = IVec2::new(2, 1);
        let mut s = Scene::new().wall(tile, WallFlags::ROTATING);
        let drawn = s.render(tile, Orientation::South, 70);
        let mid = drawn.iter().find(|p| p.column == 160).unwrap();
        assert_eq!(mid.source.post, 38);
    }

    #[test]
    fn translucent_and_invisible_walls_are_queued() {
        let tile = IVec2::new(2, 1);
        let mut s = Scene::new().wall(tile, WallFlags::TRANSLUCENT);
        assert!(s.render(tile, Orientation::South, 0).is_empty());
        let spans = s.buffers.spans.records();
        assert_eq!(spans.len(), 64);
        assert_eq!(s.buffers.posts.len(), 64);
        for rec in spans {
            assert_eq!(rec.kind(), SpanKind::TranslucentWall);
            let post = s.buffers.posts.get(rec.post().unwrap()).unwrap();
            match rec.payload {
                SpanPayload::TranslucentWall { column, .. } => assert_eq!(post.column, column),
                _ => unreachable!(),
            }
        }
        assert_eq!(s.buffers.overlay.north(2, 2), Marker::Translucent);

        let mut s = Scene::new().wall(tile, WallFlags::DAMAGE_ONLY);
        s.render(tile, Orientation::South, 0);
        assert!(s.buffers.spans.records().iter().all(|r| r.kind() == SpanKind::InvisibleWall));
        assert!(!s.buffers.spans.is_empty());
    }

    #[test]
    fn sky_wall_emits_sky_columns() {
        let tile = IVec2::new(2, 1);
        let mut s = Scene::new().wall(tile, WallFlags::SKY);
        assert!(s.render(tile, Orientation::South, 0).is_empty());
        assert!(!s.buffers.spans.is_empty());
        assert!(s.buffers.spans.records().iter().all(|r| r.kind() == SpanKind::SkyColumn));
    }

    #[test]
    fn step_toward_lower_neighbour() {
        let mut s = Scene::new();
        s.map.set_floor(IVec2::new(2, 3), PlaneAttr::flat(1, -16)).unwrap();
        s.render(IVec2::new(2, 2), Orientation::South, 0);
        let steps = s.buffers.spans.len();
        assert!(steps > 0);
        assert_eq!(steps, s.buffers.posts.len());
        assert!(s.buffers.spans.records().iter().all(|r| r.kind() == SpanKind::Step));
        // riser sits below the horizon
        assert!(s.buffers.posts.as_slice().iter().all(|p| p.top > 100));

        // level neighbour: no riser
        let mut s = Scene::new();
        s.render(IVec2::new(2, 2), Orientation::South, 0);
        assert!(s.buffers.spans.is_empty());
    }

    #[test]
    fn far_cutoff_can_stop_the_loop() {
        let cfg = RenderConfig::default();
        let t = ProjectionTables::new(cfg.width, cfg.height, cfg.fov_degrees);
        let cam = Camera::at(0.5, 40.0, 0.5, ANG270);
        let view = View::new(&cam, &t, cfg.near_bound(), cfg.far_bound(), 0);
        let plane = WallPlane::for_face(&view, IVec2::new(0, 0), Orientation::South);
        let mut n = 0;
        let done = column_loop(&view, &plane, 150, 170, Fixed::ZERO, Fixed::ONE, true, |_| {
            n += 1;
            Ok(())
        })
        .unwrap();
        assert!(!done);
        assert_eq!(n, 0);
    }
}
