//! Contingency matrix handling and the greedy correspondence ordering.

pub mod greedy;
pub mod matrix;
pub mod ordering;

pub use greedy::*;
pub use matrix::*;
pub use ordering::*;
