//! Error types for layout engine

use box_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid width: {0}")]
    InvalidWidth(f32),

    #[error("Box tree error: {0}")]
    Tree(#[from] TreeError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
