pub mod event_bus;
pub mod navigation;

pub use event_bus::*;
pub use navigation::*;
