pub mod event_bus;
pub mod ticket;

pub use event_bus::*;
pub use ticket::*;
