//! Floor and ceiling spans.
//!
//! A tile's floor (and ceiling) becomes one quad or two triangles, is
//! clipped against the near plane and handed to the trapezoid rasterizer.
//! Each scanline interval turns into a flat, sloped or sky span.

use smallvec::{SmallVec, smallvec};

use super::{
    clip::{ClipRing, clip_polygon, exceeds_ceiling_bound},
    context::RenderContext,
    error::RenderError,
    fixed::{FRACBITS, Fixed},
    spans::{SpanPayload, SpanRecord},
    tables::ProjectionTables,
    trapezoid::rasterize,
    transform::{VertexId, round_px},
    types::{ClipPoint, Projected, ScreenPoint, Vertex},
};
use crate::defs::PlaneFlags;
use crate::world::{
    DiagonalSplit, Orientation, PlaneAttr, Slope, TextureId, TileMap, height_to_fixed,
};

/*──────────────────────── plane equation ───────────────────────*/

/// `A·x + B·h + C·z + D = 0` in view space (x right, h up, z depth),
/// coefficients in 16.16.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneEquation {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub d: i64,
    min_row_term: i64,
}

impl PlaneEquation {
    /// Plane through three view-space points `(x, h, z)`; `None` when they
    /// are collinear.
    pub fn from_points(p0: [Fixed; 3], p1: [Fixed; 3], p2: [Fixed; 3]) -> Option<Self> {
        let raw = |p: [Fixed; 3]| p.map(|v| v.raw() as i64);
        let (p0, p1, p2) = (raw(p0), raw(p1), raw(p2));
        let e1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
        let e2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];

        let a = (e1[1] * e2[2] - e1[2] * e2[1]) >> FRACBITS;
        let b = (e1[2] * e2[0] - e1[0] * e2[2]) >> FRACBITS;
        let c = (e1[0] * e2[1] - e1[1] * e2[0]) >> FRACBITS;
        if a == 0 && b == 0 && c == 0 {
            return None;
        }
        let d = -((a * p0[0] + b * p0[1] + c * p0[2]) >> FRACBITS);
        Some(Self {
            a,
            b,
            c,
            d,
            min_row_term: ((a.abs() + b.abs() + c.abs()) >> 6).max(1),
        })
    }

    /// Row-dependent part of the depth denominator, doubled for the
    /// half-pixel centre. `None` when the row runs almost along the plane.
    pub fn row_term(&self, tables: &ProjectionTables, row: i32) -> Option<i64> {
        let f = tables.focal as i64;
        let dy2 = 2 * tables.center_y as i64 - 2 * row as i64 - 1;
        let term = self.b * dy2 + 2 * self.c * f;
        (term.abs() >= self.min_row_term).then_some(term)
    }

    /// Depth of pixel column `x` on a row with the given [`row_term`](Self::row_term).
    pub fn depth(&self, tables: &ProjectionTables, row_term: i64, x: i32) -> Option<Fixed> {
        let f = tables.focal as i128;
        let dx2 = 2 * x as i64 + 1 - 2 * tables.center_x as i64;
        let denom = (row_term + self.a * dx2) as i128;
        if denom == 0 {
            return None;
        }
        let z = ((-(self.d as i128) * 2 * f) << FRACBITS) / denom;
        (z > 0 && z <= i32::MAX as i128).then(|| Fixed::from_raw(z as i32))
    }
}

/*──────────────────────── span fillers ─────────────────────────*/

/// One row of a level plane `height_delta` above (+) or below (−) the eye.
pub fn flat_span(
    ctx: &mut RenderContext,
    row: i32,
    x1: i32,
    x2: i32,
    height_delta: Fixed,
    texture: TextureId,
) -> Result<(), RenderError> {
    let Some(&slope) = ctx.view.tables.y_slope.get(row as usize) else {
        return Ok(());
    };
    let depth = height_delta.abs() / slope;
    if depth > ctx.view.far {
        return Ok(());
    }
    ctx.buffers.spans.push(SpanRecord {
        depth,
        shade: ctx.shade,
        payload: SpanPayload::Flat {
            texture,
            row,
            x1,
            x2,
        },
    })?;
    Ok(())
}

/// One row of a tilted plane; both ends get their own depth.
pub fn sloped_span(
    ctx: &mut RenderContext,
    plane: &PlaneEquation,
    row: i32,
    x1: i32,
    x2: i32,
    texture: TextureId,
) -> Result<(), RenderError> {
    let tables = ctx.view.tables;
    let Some(term) = plane.row_term(tables, row) else {
        return Ok(());
    };
    let (Some(d1), Some(d2)) = (
        plane.depth(tables, term, x1),
        plane.depth(tables, term, x2 - 1),
    ) else {
        return Ok(());
    };
    // rows of a near-clipped polygon can extrapolate in front of the near plane
    let (near, far) = (ctx.view.near, ctx.view.far);
    if d1 > far || d2 > far || d1 < near || d2 < near {
        return Ok(());
    }
    ctx.buffers.spans.push(SpanRecord {
        depth: d1,
        shade: ctx.shade,
        payload: SpanPayload::Sloped {
            texture,
            row,
            x1,
            x2,
            end_depth: d2,
        },
    })?;
    Ok(())
}

/// Sky rows sit behind everything.
pub fn sky_span(
    ctx: &mut RenderContext,
    row: i32,
    x1: i32,
    x2: i32,
    texture: TextureId,
) -> Result<(), RenderError> {
    ctx.buffers.spans.push(SpanRecord {
        depth: ctx.view.far,
        shade: ctx.shade,
        payload: SpanPayload::Sky {
            texture,
            row,
            x1,
            x2,
        },
    })?;
    Ok(())
}

/*──────────────────────── tile polygons ────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

impl Corner {
    const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];

    fn offset(self) -> (i32, i32) {
        match self {
            Corner::Nw => (0, 0),
            Corner::Ne => (1, 0),
            Corner::Se => (1, 1),
            Corner::Sw => (0, 1),
        }
    }

    fn on_edge(self, edge: Orientation) -> bool {
        matches!(
            (edge, self),
            (Orientation::North, Corner::Nw | Corner::Ne)
                | (Orientation::East, Corner::Ne | Corner::Se)
                | (Orientation::South, Corner::Se | Corner::Sw)
                | (Orientation::West, Corner::Sw | Corner::Nw)
        )
    }
}

/// Height of `corner` for a plane whose base height is `base`.
fn corner_height(attr: &PlaneAttr, base: i16, corner: Corner) -> Fixed {
    let rise = match attr.slope {
        Slope::Rise { toward, rise } if corner.on_edge(toward) => rise,
        _ => 0,
    };
    height_to_fixed(base.saturating_add(rise))
}

/// Floor ring order (clockwise on screen); the ceiling walks it backwards.
struct PlanePoly {
    corners: SmallVec<[Corner; 4]>,
    height: i16,
}

fn polygons(attr: &PlaneAttr) -> SmallVec<[PlanePoly; 2]> {
    use Corner::*;
    let main = attr.height;
    match attr.split {
        DiagonalSplit::None => smallvec![PlanePoly {
            corners: smallvec![Nw, Ne, Se, Sw],
            height: main,
        }],
        DiagonalSplit::NwSe { height } => smallvec![
            PlanePoly {
                corners: smallvec![Nw, Ne, Se],
                height: main,
            },
            PlanePoly {
                corners: smallvec![Nw, Se, Sw],
                height,
            },
        ],
        DiagonalSplit::NeSw { height } => smallvec![
            PlanePoly {
                corners: smallvec![Nw, Ne, Sw],
                height: main,
            },
            PlanePoly {
                corners: smallvec![Ne, Se, Sw],
                height,
            },
        ],
    }
}

/// Which plane of a tile, and which of a vertex's fields belong to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneSide {
    Floor,
    Ceiling,
}

impl PlaneSide {
    fn attr(self, map: &TileMap, idx: usize) -> &PlaneAttr {
        match self {
            PlaneSide::Floor => &map.floors[idx],
            PlaneSide::Ceiling => &map.ceilings[idx],
        }
    }

    #[inline]
    fn height(self, v: &Vertex) -> Fixed {
        match self {
            PlaneSide::Floor => v.floor_h,
            PlaneSide::Ceiling => v.ceiling_h,
        }
    }

    #[inline]
    fn projected_y(self, p: &Projected) -> Fixed {
        match self {
            PlaneSide::Floor => p.floor_y,
            PlaneSide::Ceiling => p.ceiling_y,
        }
    }

    /// A floor is only seen from above, a ceiling only from below.
    fn faces_eye(self, min_delta: Fixed, max_delta: Fixed) -> bool {
        match self {
            PlaneSide::Floor => min_delta < Fixed::ZERO,
            PlaneSide::Ceiling => max_delta > Fixed::ZERO,
        }
    }
}

/// Floor and ceiling of the current tile.
pub fn render_tile_ends(ctx: &mut RenderContext, map: &TileMap) -> Result<(), RenderError> {
    let Some(idx) = map.index(ctx.tile) else {
        return Ok(());
    };
    if ctx.window.is_empty() {
        return Ok(());
    }

    // The four corners at the main heights are shared by floor and ceiling.
    let (floor, ceiling) = (map.floors[idx], map.ceilings[idx]);
    let mut shared = [0 as VertexId; 4];
    for (slot, corner) in shared.iter_mut().zip(Corner::ALL) {
        *slot = corner_vertex(
            ctx,
            corner,
            corner_height(&floor, floor.height, corner),
            corner_height(&ceiling, ceiling.height, corner),
        )?;
    }

    for side in [PlaneSide::Floor, PlaneSide::Ceiling] {
        let attr = *side.attr(map, idx);
        let texture = map.translate(attr.texture);
        for poly in polygons(&attr) {
            let mut ids: SmallVec<[VertexId; 4]> = SmallVec::new();
            for &corner in &poly.corners {
                let id = if poly.height == attr.height {
                    shared[corner as usize]
                } else {
                    let h = corner_height(&attr, poly.height, corner);
                    corner_vertex(ctx, corner, h, h)?
                };
                ids.push(id);
            }
            if side == PlaneSide::Ceiling {
                ids.reverse();
            }
            render_plane_poly(ctx, side, &attr, texture, &ids)?;
        }
    }
    Ok(())
}

fn corner_vertex(
    ctx: &mut RenderContext,
    corner: Corner,
    floor_h: Fixed,
    ceiling_h: Fixed,
) -> Result<VertexId, RenderError> {
    let (dx, dy) = corner.offset();
    let x = Fixed::from_int(ctx.tile.x + dx);
    let y = Fixed::from_int(ctx.tile.y + dy);
    ctx.buffers
        .vertices
        .transform(ctx.view, x, y, floor_h, ceiling_h)
}

fn render_plane_poly(
    ctx: &mut RenderContext,
    side: PlaneSide,
    attr: &PlaneAttr,
    texture: TextureId,
    ids: &[VertexId],
) -> Result<(), RenderError> {
    let eye = ctx.view.eye_z;
    let verts: SmallVec<[Vertex; 4]> = ids
        .iter()
        .map(|&id| *ctx.buffers.vertices.get(id))
        .collect();

    let deltas = verts.iter().map(|v| side.height(v) - eye);
    let min_delta = deltas.clone().fold(Fixed::MAX, Fixed::min);
    let max_delta = deltas.fold(Fixed::MIN, Fixed::max);
    if !side.faces_eye(min_delta, max_delta) {
        return Ok(());
    }

    let ring: ClipRing = if verts.iter().all(|v| v.projected().is_some()) {
        verts
            .iter()
            .filter_map(|v| {
                v.projected().map(|p| ClipPoint {
                    view_x: v.view_x,
                    height: side.height(v) - eye,
                    depth: v.depth,
                    screen: ScreenPoint {
                        x: p.screen_x,
                        y: round_px(side.projected_y(p)),
                    },
                })
            })
            .collect()
    } else {
        let unclipped: SmallVec<[ClipPoint; 4]> = verts
            .iter()
            .map(|v| ClipPoint::new(v.view_x, side.height(v) - eye, v.depth))
            .collect();
        clip_polygon(ctx.view, &unclipped)
    };
    if ring.len() < 3 {
        return Ok(());
    }
    if side == PlaneSide::Ceiling && exceeds_ceiling_bound(&ring, ctx.view.tables.height) {
        return Ok(());
    }

    let screen: SmallVec<[ScreenPoint; 8]> = ring.iter().map(|p| p.screen).collect();
    let (rows, cols) = (ctx.view.rows, ctx.window);

    if side == PlaneSide::Ceiling && attr.flags.contains(PlaneFlags::SKY) {
        return rasterize(&screen, rows, cols, |y, x1, x2| {
            sky_span(ctx, y, x1, x2, texture)
        });
    }
    if min_delta == max_delta {
        return rasterize(&screen, rows, cols, |y, x1, x2| {
            flat_span(ctx, y, x1, x2, min_delta, texture)
        });
    }
    let p = |v: &Vertex| [v.view_x, side.height(v) - eye, v.depth];
    let Some(plane) = PlaneEquation::from_points(p(&verts[0]), p(&verts[1]), p(&verts[2])) else {
        return Ok(());
    };
    rasterize(&screen, rows, cols, |y, x1, x2| {
        sloped_span(ctx, &plane, y, x1, x2, texture)
    })
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::config::RenderConfig;
    use crate::engine::context::FrameBuffers;
    use crate::engine::spans::{Shade, SpanKind};
    use crate::engine::tables::{ANG270, ProjectionTables};
    use crate::engine::transform::View;
    use crate::engine::types::ColumnWindow;
    use crate::world::Camera;

    fn setup() -> (ProjectionTables, FrameBuffers, RenderConfig) {
        let cfg = RenderConfig::default();
        (
            ProjectionTables::new(cfg.width, cfg.height, cfg.fov_degrees),
            FrameBuffers::new(&cfg),
            cfg,
        )
    }

    #[test]
    fn flat_floor_depth_is_height_over_slope() {
        let (t, mut fb, cfg) = setup();
        let cam = Camera::at(0.5, 0.5, 0.5, 0);
        let view = View::new(&cam, &t, cfg.near_bound(), cfg.far_bound(), 0);
        let mut ctx = RenderContext::new(&view, &mut fb);

        let h = -Fixed::HALF;
        let row = 150;
        flat_span(&mut ctx, row, 10, 20, h, 3).unwrap();
        let rec = ctx.buffers.spans.records()[0];
        assert_eq!(rec.depth, (-h) / t.y_slope[row as usize]);
        assert_eq!(rec.kind(), SpanKind::Flat);

        // a row next to the horizon is past the far bound
        flat_span(&mut ctx, 100, 10, 20, h, 3).unwrap();
        assert_eq!(ctx.buffers.spans.len(), 1);
    }

    #[test]
    fn plane_equation_matches_flat_depth() {
        let t = ProjectionTables::new(320, 200, 90.0);
        let f = |x: f32, h: f32, z: f32| [Fixed::from_f32(x), Fixed::from_f32(h), Fixed::from_f32(z)];
        let plane =
            PlaneEquation::from_points(f(-1.0, -0.5, 2.0), f(1.0, -0.5, 2.0), f(1.0, -0.5, 3.0))
                .unwrap();
        for row in [120, 150, 199] {
            let term = plane.row_term(&t, row).unwrap();
            let flat = Fixed::HALF / t.y_slope[row as usize];
            for x in [0, 160, 319] {
                let d = plane.depth(&t, term, x).unwrap();
                assert!((d.raw() - flat.raw()).abs() < 64, "row {row} x {x}: {d} vs {flat}");
            }
        }
        assert!(PlaneEquation::from_points(f(0.0, 0.0, 1.0), f(1.0, 0.0, 1.0), f(2.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn tilted_plane_changes_depth_across_row() {
        let t = ProjectionTables::new(320, 200, 90.0);
        let f = |x: f32, h: f32, z: f32| [Fixed::from_f32(x), Fixed::from_f32(h), Fixed::from_f32(z)];
        // rises toward +x (viewer's right)
        let plane =
            PlaneEquation::from_points(f(-1.0, -0.75, 2.0), f(1.0, -0.25, 2.0), f(1.0, -0.25, 3.0))
                .unwrap();
        let term = plane.row_term(&t, 170).unwrap();
        let left = plane.depth(&t, term, 100).unwrap();
        let right = plane.depth(&t, term, 220).unwrap();
        assert!(left > right);
    }

    #[test]
    fn sloped_row_nearer_than_near_plane_is_dropped() {
        let t = ProjectionTables::new(320, 200, 90.0);
        let f = |x: f32, h: f32, z: f32| [Fixed::from_f32(x), Fixed::from_f32(h), Fixed::from_f32(z)];
        let plane =
            PlaneEquation::from_points(f(-1.0, -0.5, 2.0), f(1.0, -0.5, 2.0), f(1.0, -0.5, 3.0))
                .unwrap();
        let row = 150;
        let depth = Fixed::HALF / t.y_slope[row as usize];
        let cam = Camera::at(0.5, 0.5, 0.5, 0);
        let far = Fixed::from_int(32);

        let mut fb = FrameBuffers::new(&RenderConfig::default());
        let close = View::new(&cam, &t, Fixed::from_raw(depth.raw() / 2), far, 0);
        let mut ctx = RenderContext::new(&close, &mut fb);
        sloped_span(&mut ctx, &plane, row, 10, 20, 3).unwrap();
        assert_eq!(fb.spans.len(), 1);
        assert_eq!(fb.spans.records()[0].kind(), SpanKind::Sloped);

        let mut fb = FrameBuffers::new(&RenderConfig::default());
        let deep = View::new(&cam, &t, depth.scale(2), far, 0);
        let mut ctx = RenderContext::new(&deep, &mut fb);
        sloped_span(&mut ctx, &plane, row, 10, 20, 3).unwrap();
        assert!(fb.spans.is_empty());
    }

    fn render_tile(map: &TileMap, cam: Camera) -> Vec<SpanRecord> {
        let (t, mut fb, cfg) = setup();
        let view = View::new(&cam, &t, cfg.near_bound(), cfg.far_bound(), 0);
        let mut ctx = RenderContext::new(&view, &mut fb);
        ctx.enter_tile(IVec2::new(2, 2), ColumnWindow::full(320), Shade::Light(99));
        render_tile_ends(&mut ctx, map).unwrap();
        fb.spans.records().to_vec()
    }

    #[test]
    fn open_tile_emits_floor_and_ceiling_rows() {
        let map = TileMap::new(5, 5, 1, 2);
        // looking north at tile (2,2) from two tiles south
        let spans = render_tile(&map, Camera::at(2.5, 5.0, 0.5, ANG270));
        let floors = spans
            .iter()
            .filter(|s| matches!(s.payload, SpanPayload::Flat { texture: 1, row, .. } if row > 100))
            .count();
        let ceilings = spans
            .iter()
            .filter(|s| matches!(s.payload, SpanPayload::Flat { texture: 2, row, .. } if row < 100))
            .count();
        assert!(floors > 0);
        assert_eq!(floors, ceilings);
        assert!(spans.iter().all(|s| s.shade == Shade::Light(99)));
    }

    #[test]
    fn floor_above_eye_is_skipped() {
        let mut map = TileMap::new(5, 5, 1, 2);
        map.set_floor(IVec2::new(2, 2), PlaneAttr::flat(1, 40)).unwrap();
        let spans = render_tile(&map, Camera::at(2.5, 5.0, 0.5, ANG270));
        assert!(spans.iter().all(|s| !matches!(s.payload, SpanPayload::Flat { texture: 1, .. })));
    }

    #[test]
    fn slope_and_split_produce_sloped_rows() {
        let mut map = TileMap::new(5, 5, 1, 2);
        let mut floor = PlaneAttr::flat(1, 0);
        floor.slope = Slope::Rise {
            toward: Orientation::North,
            rise: 16,
        };
        map.set_floor(IVec2::new(2, 2), floor).unwrap();
        let spans = render_tile(&map, Camera::at(2.5, 5.0, 0.5, ANG270));
        assert!(spans.iter().any(|s| s.kind() == SpanKind::Sloped));

        let mut map = TileMap::new(5, 5, 1, 2);
        let mut floor = PlaneAttr::flat(1, 0);
        floor.split = DiagonalSplit::NwSe { height: -16 };
        map.set_floor(IVec2::new(2, 2), floor).unwrap();
        let spans = render_tile(&map, Camera::at(2.5, 5.0, 0.5, ANG270));
        let floor_rows: Vec<i32> = spans
            .iter()
            .filter_map(|s| match s.payload {
                SpanPayload::Flat { texture: 1, row, .. } => Some(row),
                _ => None,
            })
            .collect();
        // the lower triangle projects further down the screen
        assert!(floor_rows.iter().any(|&r| r < 140));
        assert!(floor_rows.iter().any(|&r| r > 145));
        assert!(spans.iter().all(|s| s.kind() != SpanKind::Sloped));
    }

    #[test]
    fn sky_ceiling_emits_sky_rows_at_far() {
        let mut map = TileMap::new(5, 5, 1, 2);
        let mut ceil = PlaneAttr::flat(2, 64);
        ceil.flags = PlaneFlags::SKY;
        map.set_ceiling(IVec2::new(2, 2), ceil).unwrap();
        let spans = render_tile(&map, Camera::at(2.5, 5.0, 0.5, ANG270));
        let sky: Vec<_> = spans.iter().filter(|s| s.kind() == SpanKind::Sky).collect();
        assert!(!sky.is_empty());
        assert!(sky.iter().all(|s| s.depth == Fixed::from_int(32)));
    }

    #[test]
    fn tile_around_camera_is_clipped_not_dropped() {
        let map = TileMap::new(5, 5, 1, 2);
        let spans = render_tile(&map, Camera::at(2.5, 2.9, 0.5, ANG270));
        assert!(spans.iter().any(|s| matches!(s.payload, SpanPayload::Flat { row, .. } if row == 199)));
    }
}
