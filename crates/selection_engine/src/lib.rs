//! Selection Engine - Selection and search across inline containers
//!
//! Both state machines walk the box tree's inline containers in reading
//! order and mark ranges on the containers themselves, so highlighting
//! never needs another layout pass.

mod search;
mod selection;

pub use search::*;
pub use selection::*;
