//! Page - One document view
//!
//! A [`Page`] owns the builder for the document being shown, lays it out
//! for the viewport, and routes pointer and keyboard input to selection,
//! link following, form controls, and find. The host performs transfers:
//! navigation hands it a [`NavigationRequest`] and it reports headers,
//! markup chunks, and completion back under the request's generation.

mod config;
mod error;
mod navigation;
mod page;
mod status;

pub use config::*;
pub use error::*;
pub use navigation::*;
pub use page::*;
pub use status::*;
