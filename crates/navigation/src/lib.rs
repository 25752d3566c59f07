//! Spatial navigation between panoramas.
//!
//! Three coordinate spaces meet here: world units as authored in the feed,
//! map-projection space for the top-down map, and viewer space inside a
//! panorama. `transform` and `map` cover the first two, `neighbors` and
//! `hotspot` the last, and `controller` ties them to user input.

pub mod config;
pub mod controller;
pub mod error;
pub mod hotspot;
pub mod map;
pub mod neighbors;
pub mod scene;
pub mod state;
pub mod transform;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use hotspot::*;
pub use map::*;
pub use neighbors::*;
pub use scene::*;
pub use state::*;
pub use transform::*;
