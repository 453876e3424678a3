//! Error types for text engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("Offset {offset} is not a character boundary in a {len}-byte run")]
    InvalidOffset { offset: usize, len: usize },

    #[error("Invalid shaper configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
