//! Box Tree - The document as a tree of layout boxes
//!
//! Nodes live in an arena owned by [`BoxTree`] and refer to each other by
//! [`NodeId`]. Inline containers own their items; links, forms, and named
//! anchors are indexed by the tree so they can be found from hit tests.

mod anchor;
mod error;
mod form;
mod geometry;
mod inline;
mod link;
mod node;
mod node_id;
mod tree;

pub use anchor::*;
pub use error::*;
pub use form::*;
pub use geometry::*;
pub use inline::*;
pub use link::*;
pub use node::*;
pub use node_id::*;
pub use tree::*;
