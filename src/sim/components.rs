use crate::defs::ObjectFlags;
use crate::engine::fixed::Fixed;

/// World-space position in tiles; `z` is the absolute height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldPos {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Fixed::from_f32(x),
            y: Fixed::from_f32(y),
            z: Fixed::from_f32(z),
        }
    }
}

/// Heading as a fine angle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facing(pub u32);

/// How many directional views a sprite has per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Single,
    Four,
    Eight,
}

impl Rotation {
    #[inline]
    pub fn views(self) -> u16 {
        match self {
            Rotation::Single => 1,
            Rotation::Four => 4,
            Rotation::Eight => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpecialType {
    #[default]
    Normal,
    /// Lamps, flames, projectiles: ignore tile lighting.
    Luminous,
}

/// What the sprite projector needs to pick a picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteState {
    pub base_picture: u16,
    pub rotation: Rotation,
    pub special: SpecialType,
    pub flags: ObjectFlags,
}

/* ── Animation ─────────────────────────────────────────────────────── */

const FRAME_SHIFT: u32 = 0;
const COUNT_SHIFT: u32 = 8;
const DELAY_SHIFT: u32 = 16;
const LOOP_BIT: u32 = 1 << 24;
const SELF_DESTRUCT_BIT: u32 = 1 << 25;

/// Cyclic frame counter.
///
/// A non-looping animation stops on its last frame and reports
/// [`finished`](Self::finished) once that frame's delay has elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimState {
    pub frame: u8,
    pub frame_count: u8,
    /// Tics per frame.
    pub delay: u8,
    pub ticks: u8,
    pub looping: bool,
    pub self_destruct: bool,
    done: bool,
}

impl AnimState {
    pub fn new(frame_count: u8, delay: u8, looping: bool) -> Self {
        Self {
            frame_count,
            delay,
            looping,
            ..Self::default()
        }
    }

    /// One-shot animation that removes its object when it ends.
    pub fn one_shot(frame_count: u8, delay: u8) -> Self {
        Self {
            self_destruct: true,
            ..Self::new(frame_count, delay, false)
        }
    }

    /// Decode the packed asset word.
    pub fn from_packed(word: u32) -> Self {
        Self {
            frame: (word >> FRAME_SHIFT) as u8,
            frame_count: (word >> COUNT_SHIFT) as u8,
            delay: (word >> DELAY_SHIFT) as u8,
            ticks: 0,
            looping: word & LOOP_BIT != 0,
            self_destruct: word & SELF_DESTRUCT_BIT != 0,
            done: false,
        }
    }

    pub fn to_packed(&self) -> u32 {
        let mut w = (self.frame as u32) << FRAME_SHIFT
            | (self.frame_count as u32) << COUNT_SHIFT
            | (self.delay as u32) << DELAY_SHIFT;
        if self.looping {
            w |= LOOP_BIT;
        }
        if self.self_destruct {
            w |= SELF_DESTRUCT_BIT;
        }
        w
    }

    /// Advance by one game tic.
    pub fn tick(&mut self) {
        if self.done {
            return;
        }
        self.ticks = self.ticks.saturating_add(1);
        if self.ticks < self.delay.max(1) {
            return;
        }
        self.ticks = 0;
        if self.frame.saturating_add(1) < self.frame_count {
            self.frame += 1;
        } else if self.looping {
            self.frame = 0;
        } else {
            self.done = true;
        }
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.done
    }

    /// Self-destructing and done: the object should be removed.
    #[inline]
    pub fn expired(&self) -> bool {
        self.self_destruct && self.done
    }
}
