//! Named anchors

use crate::NodeId;
use std::collections::HashMap;

/// The leaf an identifier is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTarget {
    /// A text run, by container and item index
    Text { container: NodeId, item: usize },
    /// An embedded object
    Object(NodeId),
}

/// Identifier to leaf map; rebinding a name replaces its target
#[derive(Debug, Clone, Default)]
pub struct AnchorTable {
    targets: HashMap<String, AnchorTarget>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the target it replaced
    pub fn bind(&mut self, name: impl Into<String>, target: AnchorTarget) -> Option<AnchorTarget> {
        self.targets.insert(name.into(), target)
    }

    pub fn get(&self, name: &str) -> Option<AnchorTarget> {
        self.targets.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_binding_wins() {
        let mut anchors = AnchorTable::new();
        let first = AnchorTarget::Object(NodeId::from_index(1));
        let second = AnchorTarget::Object(NodeId::from_index(2));
        assert_eq!(anchors.bind("top", first), None);
        assert_eq!(anchors.bind("top", second), Some(first));
        assert_eq!(anchors.get("top"), Some(second));
        assert_eq!(anchors.get("missing"), None);
    }
}
