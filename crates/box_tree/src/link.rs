//! Hyperlinks

use crate::{NodeId, TextRange};

/// A hyperlink anchored in one inline container
#[derive(Debug, Clone)]
pub struct Link {
    /// Target as written in the markup, unresolved
    pub href: String,
    pub container: NodeId,
    /// Covered text of the container
    pub range: TextRange,
    /// Embedded objects (images) inside the link
    pub objects: Vec<NodeId>,
}

impl Link {
    /// Create a new link that starts (and for now ends) at `offset`
    pub fn new(href: impl Into<String>, container: NodeId, offset: usize) -> Self {
        Self {
            href: href.into(),
            container,
            range: TextRange::new(offset, offset),
            objects: Vec::new(),
        }
    }

    pub fn covers_offset(&self, offset: usize) -> bool {
        self.range.contains(offset)
    }

    /// Target is a fragment of the current document
    pub fn is_fragment_only(&self) -> bool {
        self.href.starts_with('#')
    }
}
