pub mod flags;

pub use self::flags::{ObjectFlags, PlaneFlags, WallFlags};
