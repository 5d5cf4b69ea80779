use bitflags::bitflags;

bitflags! {
    /// Behaviour flags of a wall tile.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WallFlags: u8 {
        // Drawn through the pending post queue, see-through texels.
        const TRANSLUCENT = 0x01;
        // Texture posts scroll one post per frame.
        const ROTATING    = 0x04;
        // Not drawn, only hurts (force fields).
        const DAMAGE_ONLY = 0x08;
        // Shows the sky texture instead of a wall.
        const SKY         = 0x10;
    }
}

bitflags! {
    /// Flags of a floor or ceiling plane.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PlaneFlags: u8 {
        const SKY = 0x01;
    }
}

bitflags! {
    /// Runtime flags of a dynamic object.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        // Ignores tile lighting; always fullbright.
        const NO_CLIP = 0x01;
    }
}
