pub mod angle;
pub mod precision;
pub mod rotation;
pub mod vec;

pub use angle::*;
pub use precision::*;
pub use rotation::*;
pub use vec::*;
