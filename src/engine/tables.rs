//! Trigonometry and projection tables.
//!
//! * Fine-angle sine/tangent and the tangent→angle table are resolution
//!   independent and built lazily once per process.
//! * [`ProjectionTables`] holds the per-column ray angles and the per-row
//!   vertical slopes; it is rebuilt whenever the resolution or FOV changes.

use std::f64::consts::TAU;

use once_cell::sync::Lazy;

use super::fixed::{FRACBITS, FRACUNIT, Fixed};

/// Fine angles per full turn.
pub const FINEANGLES: usize = 8192;
pub const FINEMASK: u32 = FINEANGLES as u32 - 1;

pub const ANG90: u32 = FINEANGLES as u32 / 4;
pub const ANG180: u32 = ANG90 * 2;
pub const ANG270: u32 = ANG90 * 3;

/// Steps in the tangent→angle table (covers slopes 0..=1).
const SLOPERANGE: i64 = 2048;

/// Tangents are clamped here near the asymptotes.
pub const MAX_TANGENT: Fixed = Fixed::from_raw(256 * FRACUNIT);

static FINE_SINE: Lazy<Box<[Fixed]>> = Lazy::new(|| {
    (0..FINEANGLES)
        .map(|i| Fixed::from_f32(angle_rad(i as i64).sin() as f32))
        .collect()
});

static FINE_TANGENT: Lazy<Box<[Fixed]>> = Lazy::new(|| {
    let max = MAX_TANGENT.to_f32() as f64;
    (0..FINEANGLES)
        .map(|i| Fixed::from_f32(angle_rad(i as i64).tan().clamp(-max, max) as f32))
        .collect()
});

static TAN_TO_ANGLE: Lazy<Box<[u32]>> = Lazy::new(|| {
    (0..=SLOPERANGE)
        .map(|i| {
            let a = (i as f64 / SLOPERANGE as f64).atan();
            (a / TAU * FINEANGLES as f64).round() as u32
        })
        .collect()
});

#[inline]
fn angle_rad(fine: i64) -> f64 {
    fine as f64 * TAU / FINEANGLES as f64
}

#[inline]
pub fn finesine(angle: u32) -> Fixed {
    FINE_SINE[(angle & FINEMASK) as usize]
}

#[inline]
pub fn finecosine(angle: u32) -> Fixed {
    FINE_SINE[(angle.wrapping_add(ANG90) & FINEMASK) as usize]
}

#[inline]
pub fn finetangent(angle: u32) -> Fixed {
    FINE_TANGENT[(angle & FINEMASK) as usize]
}

/// Degrees → fine angle (wrapped).
pub fn fine_from_degrees(deg: f32) -> u32 {
    let turns = (deg as f64 / 360.0).rem_euclid(1.0);
    ((turns * FINEANGLES as f64).round() as u32) & FINEMASK
}

/// Direction of the vector `(dx, dy)` as a fine angle.
///
/// Angle 0 points along +x, [`ANG90`] along +y.
pub fn point_to_angle(dx: Fixed, dy: Fixed) -> u32 {
    let (x, y) = (dx.raw() as i64, dy.raw() as i64);
    if x == 0 && y == 0 {
        return 0;
    }
    let (ax, ay) = (x.abs(), y.abs());
    let octant = if ax >= ay {
        TAN_TO_ANGLE[(ay * SLOPERANGE / ax) as usize]
    } else {
        ANG90 - TAN_TO_ANGLE[(ax * SLOPERANGE / ay) as usize]
    };
    let a = match (x >= 0, y >= 0) {
        (true, true) => octant,
        (false, true) => ANG180 - octant,
        (false, false) => ANG180 + octant,
        (true, false) => (FINEANGLES as u32).wrapping_sub(octant),
    };
    a & FINEMASK
}

/*──────────────────────── per-resolution tables ───────────────────────*/

/// Screen-dependent lookup tables.
#[derive(Clone, Debug)]
pub struct ProjectionTables {
    pub width: usize,
    pub height: usize,
    pub center_x: i32,
    pub center_y: i32,
    /// Projection scale in pixels (`center_x / tan(fov/2)`).
    pub focal: i32,
    /// Fine-angle offset of the ray through each column centre (+ = right).
    pub pixel_angle: Vec<i32>,
    /// Cosine of `pixel_angle`.
    pub ray_cos: Vec<Fixed>,
    /// `|row + ½ − center_y| / focal` for every row.
    pub y_slope: Vec<Fixed>,
    fov_degrees: f32,
}

impl ProjectionTables {
    pub fn new(width: usize, height: usize, fov_degrees: f32) -> Self {
        let mut t = Self {
            width: 0,
            height: 0,
            center_x: 0,
            center_y: 0,
            focal: 1,
            pixel_angle: Vec::new(),
            ray_cos: Vec::new(),
            y_slope: Vec::new(),
            fov_degrees: 0.0,
        };
        t.rebuild(width, height, fov_degrees);
        t
    }

    /// Rebuild when any input changed; returns `true` if it did.
    pub fn resize(&mut self, width: usize, height: usize, fov_degrees: f32) -> bool {
        if width == self.width && height == self.height && fov_degrees == self.fov_degrees {
            return false;
        }
        self.rebuild(width, height, fov_degrees);
        true
    }

    fn rebuild(&mut self, width: usize, height: usize, fov_degrees: f32) {
        let half_fov = (fov_degrees as f64).to_radians() * 0.5;
        let center_x = (width / 2) as i32;
        let center_y = (height / 2) as i32;
        let focal = ((center_x as f64 / half_fov.tan()).round() as i32).max(1);

        self.pixel_angle = (0..width)
            .map(|x| {
                let off = x as f64 + 0.5 - center_x as f64;
                ((off / focal as f64).atan() / TAU * FINEANGLES as f64).round() as i32
            })
            .collect();
        self.ray_cos = self
            .pixel_angle
            .iter()
            .map(|&a| finecosine(a as u32))
            .collect();
        self.y_slope = (0..height as i32)
            .map(|row| {
                let d = if row >= center_y {
                    row - center_y
                } else {
                    center_y - row - 1
                } as i64;
                let raw = ((2 * d + 1) << FRACBITS) / (2 * focal as i64);
                Fixed::from_raw(raw as i32)
            })
            .collect();

        self.width = width;
        self.height = height;
        self.center_x = center_x;
        self.center_y = center_y;
        self.focal = focal;
        self.fov_degrees = fov_degrees;

        log::debug!("projection tables rebuilt: {width}x{height}, fov {fov_degrees}°, focal {focal}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Fixed, b: f32, eps: f32) -> bool {
        (a.to_f32() - b).abs() < eps
    }

    #[test]
    fn sine_cosine_cardinal_points() {
        assert_eq!(finesine(0), Fixed::ZERO);
        assert_eq!(finesine(ANG90), Fixed::ONE);
        assert_eq!(finecosine(0), Fixed::ONE);
        assert_eq!(finecosine(ANG180), -Fixed::ONE);
        assert!(close(finesine(ANG270), -1.0, 1e-4));
        // masking wraps whole turns
        assert_eq!(finesine(ANG90 + FINEANGLES as u32), Fixed::ONE);
    }

    #[test]
    fn tangent_is_clamped() {
        assert!(finetangent(ANG90) <= MAX_TANGENT);
        assert!(close(finetangent(ANG90 / 2), 1.0, 1e-3));
        assert!(close(finetangent(FINEANGLES as u32 - ANG90 / 2), -1.0, 1e-3));
    }

    #[test]
    fn point_to_angle_quadrants() {
        let one = Fixed::ONE;
        assert_eq!(point_to_angle(one, Fixed::ZERO), 0);
        assert_eq!(point_to_angle(Fixed::ZERO, one), ANG90);
        assert_eq!(point_to_angle(-one, Fixed::ZERO), ANG180);
        assert_eq!(point_to_angle(Fixed::ZERO, -one), ANG270);
        assert_eq!(point_to_angle(one, one), ANG90 / 2);
        assert_eq!(point_to_angle(-one, -one), ANG180 + ANG90 / 2);
    }

    #[test]
    fn projection_tables_are_symmetric() {
        let t = ProjectionTables::new(320, 200, 90.0);
        assert_eq!(t.focal, 160);
        assert_eq!(t.center_x, 160);
        for x in 0..160 {
            assert_eq!(t.pixel_angle[x], -t.pixel_angle[319 - x]);
        }
        assert!(t.pixel_angle.windows(2).all(|w| w[0] <= w[1]));
        for row in 0..100 {
            assert_eq!(t.y_slope[row], t.y_slope[199 - row]);
            assert!(t.y_slope[row] > Fixed::ZERO);
        }
        // bottom row: (99 + 0.5) / 160
        assert!(close(t.y_slope[199], 99.5 / 160.0, 1e-4));
    }

    #[test]
    fn resize_only_rebuilds_on_change() {
        let mut t = ProjectionTables::new(320, 200, 90.0);
        assert!(!t.resize(320, 200, 90.0));
        assert!(t.resize(640, 400, 90.0));
        assert_eq!(t.pixel_angle.len(), 640);
        assert_eq!(t.y_slope.len(), 400);
    }
}
