//! Status bar messages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the host should show in its status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusMessage {
    Requesting,
    GotHeaders,
    Loading,
    Ready,
    LoadFailed,
    /// An image could not be fetched or decoded; its placeholder stays empty
    ImageFailed(String),
    /// URL of the link under the pointer or holding keyboard focus
    LinkTarget(String),
    /// The pointer left the link
    Cleared,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Requesting => write!(f, "Requesting"),
            StatusMessage::GotHeaders => write!(f, "Got headers"),
            StatusMessage::Loading => write!(f, "Loading"),
            StatusMessage::Ready => write!(f, "Ready"),
            StatusMessage::LoadFailed => write!(f, "Failed to load the document"),
            StatusMessage::ImageFailed(url) => write!(f, "Failed to load image {}", url),
            StatusMessage::LinkTarget(url) => write!(f, "{}", url),
            StatusMessage::Cleared => Ok(()),
        }
    }
}
