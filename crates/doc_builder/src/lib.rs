//! Document Builder - Markup events to box tree
//!
//! The builder consumes start/characters/end events from any tag-soup
//! tokenizer and grows a [`box_tree::BoxTree`] incrementally: whitespace is
//! collapsed into words, words are shaped through the shared
//! [`text_engine::TextRunCache`], and structural tags push and pop
//! containers on an insertion stack.

mod builder;
mod config;
mod error;
mod events;
mod images;
mod spans;
mod tags;
mod whitespace;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use images::*;
pub use spans::*;
pub use tags::*;
pub use whitespace::*;
