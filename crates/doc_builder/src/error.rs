//! Error types for document building

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Builder for generation {0} is no longer active")]
    Inactive(u64),

    #[error("Invalid document URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Box tree error: {0}")]
    Tree(#[from] box_tree::TreeError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
