mod camera;
mod doors;
mod texture;
mod tiles;

pub use camera::Camera;

pub use doors::{Door, DoorAxis, DoorId};

pub use texture::{
    LIGHT_LEVELS, NO_TEXTURE, ShadeTable, TEXTURE_SIZE, Texture, TextureBank, TextureError,
    TextureId, linear_light_tables,
};

pub use tiles::{
    DiagonalSplit, DoorTextures, Faces, HEIGHT_UNIT, MapError, NO_WALL, Orientation, PlaneAttr,
    Slope, TileMap, WallAttr, height_to_fixed,
};
