use glam::IVec2;

use super::texture::TextureId;
use crate::engine::fixed::Fixed;

pub type DoorId = u16;

/// Direction a door is walked through.
///
/// `EastWest` doors stand in a plane of constant x, `NorthSouth` doors in a
/// plane of constant y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorAxis {
    NorthSouth,
    EastWest,
}

/// Sliding door occupying one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    pub tile: IVec2,
    pub axis: DoorAxis,
    /// Travel position in `[0, 1]`; 0 is closed.
    pub position: Fixed,
    pub leaf_texture: TextureId,
    /// Leaf has see-through texels.
    pub transparent: bool,
}

impl Door {
    pub fn new(tile: IVec2, axis: DoorAxis, leaf_texture: TextureId) -> Self {
        Self {
            tile,
            axis,
            position: Fixed::ZERO,
            leaf_texture,
            transparent: false,
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.position <= Fixed::ZERO
    }

    /// Move by `delta` and clamp into `[0, 1]`.
    pub fn slide(&mut self, delta: Fixed) {
        self.position = (self.position + delta).max(Fixed::ZERO).min(Fixed::ONE);
    }
}
