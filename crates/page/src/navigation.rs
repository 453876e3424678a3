//! Requests the page hands to its host

use box_tree::{FormMethod, FormSubmission};
use doc_builder::Generation;
use url::Url;

/// A document transfer the host should start, replacing any in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Token the host reports the transfer's progress under
    pub generation: Generation,
    pub url: Url,
    pub method: FormMethod,
    /// Url-encoded body of a POST submission
    pub body: Option<String>,
}

impl NavigationRequest {
    pub fn get(generation: Generation, url: Url) -> Self {
        Self {
            generation,
            url,
            method: FormMethod::Get,
            body: None,
        }
    }

    pub fn from_submission(generation: Generation, submission: FormSubmission) -> Self {
        Self {
            generation,
            url: submission.url,
            method: submission.method,
            body: submission.body,
        }
    }

    /// Content type of the body, when there is one
    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|_| FormSubmission::CONTENT_TYPE)
    }
}

/// What an input event asks the host to do
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    /// This page started loading a new document
    Navigate(NavigationRequest),
    /// Open the URL in another tab; this page is left alone
    OpenInNewTab(Url),
    /// Scroll the viewport so this document y is at the top
    ScrollTo(f32),
}

/// Which pointer button an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}
