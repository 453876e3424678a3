//! Image fetch requests and completion tickets

use box_tree::{ImageSize, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Navigation generation; bumped for every new document request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Identifies the placeholder an image completion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket {
    pub generation: Generation,
    pub node: NodeId,
}

/// An image the host should fetch and decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: ImageTicket,
    pub url: Url,
}

/// Why an image could not be delivered
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Image could not be decoded")]
    Decode,

    #[error("Scheme not supported: {0}")]
    UnsupportedScheme(String),
}

/// Size an image is displayed at: never wider than `max_width`, never upscaled
pub fn scale_to_fit(size: ImageSize, max_width: f32) -> (f32, f32) {
    let (width, height) = (size.width as f32, size.height as f32);
    if max_width > 0.0 && width > max_width {
        let scaled = (height * max_width / width).floor().max(1.0);
        (max_width.floor(), scaled)
    } else {
        (width, height)
    }
}
