//! Error types for box tree operations

use crate::{FormEncoding, FormId, LinkId, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {id} is not a {expected}")]
    WrongKind { id: NodeId, expected: &'static str },

    #[error("A {parent} node cannot contain a {child} node")]
    CannotContain {
        parent: &'static str,
        child: &'static str,
    },

    #[error("Table {0} has no row to hold a cell")]
    NoTableRow(NodeId),

    #[error("Link not found: {0:?}")]
    LinkNotFound(LinkId),

    #[error("Form not found: {0:?}")]
    FormNotFound(FormId),

    #[error("Form encoding not supported: {0:?}")]
    UnsupportedEncoding(FormEncoding),
}

pub type Result<T> = std::result::Result<T, TreeError>;
