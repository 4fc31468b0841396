//! Linked views over one pair of time steps and the coordinator that keeps
//! their highlight state in sync.

pub mod coordinator;
pub mod correspondence;
pub mod mounts;
pub mod palette;
pub mod picking;
pub mod selection;
pub mod views;

pub use coordinator::*;
pub use correspondence::*;
pub use mounts::*;
pub use selection::*;
