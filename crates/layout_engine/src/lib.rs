//! Layout Engine - Positions the box tree inside a width
//!
//! Inline containers are flowed into baseline-aligned lines, tables are
//! sized column by column, and blocks stack their children. Layout is a
//! pure function of the tree and the width: running it twice yields the
//! same geometry.

mod engine;
mod error;
mod hit_test;
mod inline_flow;
mod table_layout;

pub use engine::*;
pub use error::*;
pub use hit_test::*;
pub use inline_flow::*;
pub use table_layout::*;
