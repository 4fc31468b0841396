pub mod geo;
pub mod planar;
pub mod precision;
pub mod projection;

pub use geo::*;
pub use planar::*;
pub use precision::*;
pub use projection::*;
