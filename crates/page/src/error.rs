//! Error types for page operations

use box_tree::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("No document is loaded")]
    NoDocument,

    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Node {0} is not a form control")]
    NotAControl(NodeId),

    #[error("Build error: {0}")]
    Build(#[from] doc_builder::BuildError),

    #[error("Layout error: {0}")]
    Layout(#[from] layout_engine::LayoutError),

    #[error("Box tree error: {0}")]
    Tree(#[from] box_tree::TreeError),
}

pub type Result<T> = std::result::Result<T, PageError>;
