pub mod backend;
pub mod cache;
pub mod protocol;

pub use backend::*;
pub use cache::*;
pub use protocol::*;
