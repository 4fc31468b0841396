pub mod graph;
pub mod map;
pub mod table;

pub use graph::*;
pub use map::*;
pub use table::*;

use crate::selection::Highlight;

/// A view that restyles itself from the shared highlight state.
pub trait HighlightTarget: Send {
    fn apply(&mut self, highlight: &Highlight);
}
