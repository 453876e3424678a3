//! Text Engine - Style spans, text shaping, and the shaped-text cache
//!
//! Words produced by the document builder are shaped once per distinct
//! (text, style) pair and shared through [`TextRunCache`].
//!
//! # Modules
//!
//! - `style`: Style attributes, attribute spans, and their canonical form
//! - `shaper`: The shaping seam and an estimating shaper
//! - `run_cache`: Process-wide cache of shaped words

mod error;
mod run_cache;
mod shaper;
mod style;

pub use error::*;
pub use run_cache::*;
pub use shaper::*;
pub use style::*;
