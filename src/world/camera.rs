use crate::engine::fixed::Fixed;
use crate::engine::tables::{FINEMASK, finecosine, finesine};

/// Player view-point in world space.
///
/// * Only **yaw** is simulated; there is no pitch.
/// * `z` is the absolute eye height in tiles.
/// * `angle` is a fine angle: 0 looks along +x, positive turns toward +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    x: Fixed,
    y: Fixed,
    z: Fixed,
    angle: u32,
}

impl Camera {
    pub fn new(x: Fixed, y: Fixed, z: Fixed, angle: u32) -> Self {
        Self {
            x,
            y,
            z,
            angle: angle & FINEMASK,
        }
    }

    /// Convenience constructor in tile units.
    pub fn at(x: f32, y: f32, z: f32, angle: u32) -> Self {
        Self::new(Fixed::from_f32(x), Fixed::from_f32(y), Fixed::from_f32(z), angle)
    }

    #[inline]
    pub fn x(&self) -> Fixed {
        self.x
    }

    #[inline]
    pub fn y(&self) -> Fixed {
        self.y
    }

    #[inline]
    pub fn z(&self) -> Fixed {
        self.z
    }

    #[inline]
    pub fn angle(&self) -> u32 {
        self.angle
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` along the view direction and `side` to the right.
    pub fn step(&mut self, forward: Fixed, side: Fixed) {
        let (c, s) = (finecosine(self.angle), finesine(self.angle));
        // right = forward rotated a quarter turn toward +y
        self.x += forward * c - side * s;
        self.y += forward * s + side * c;
    }

    /// Rotate by `delta` fine angles (positive = turn right).
    pub fn turn(&mut self, delta: i32) {
        self.angle = self.angle.wrapping_add_signed(delta) & FINEMASK;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tables::{ANG90, FINEANGLES};

    #[test]
    fn step_follows_heading() {
        let mut cam = Camera::at(1.0, 1.0, 0.5, 0);
        cam.step(Fixed::ONE, Fixed::ZERO);
        assert_eq!(cam.x(), Fixed::from_int(2));
        assert_eq!(cam.y(), Fixed::ONE);

        // facing +y, a right strafe goes toward -x
        let mut cam = Camera::at(1.0, 1.0, 0.5, ANG90);
        cam.step(Fixed::ZERO, Fixed::ONE);
        assert_eq!(cam.x(), Fixed::ZERO);
        assert_eq!(cam.y(), Fixed::ONE);
    }

    #[test]
    fn turn_wraps() {
        let mut cam = Camera::at(0.0, 0.0, 0.5, 10);
        cam.turn(-20);
        assert_eq!(cam.angle(), FINEANGLES as u32 - 10);
        cam.turn(20);
        assert_eq!(cam.angle(), 10);
    }
}
