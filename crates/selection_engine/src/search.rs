//! Incremental forward search
//!
//! Matching is case-insensitive and runs over each container's own text,
//! so match offsets are byte offsets into that text and can be used as a
//! highlight range directly.

use box_tree::{BoxTree, NodeId, TextRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the search cursor stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    /// No match yet; the next search starts from the first container
    #[default]
    NotStarted,
    /// Walking containers
    Scanning,
    Found,
}

/// A match in one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub container: NodeId,
    pub range: TextRange,
}

/// Forward search over inline containers in reading order
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    state: SearchState,
    current: Option<SearchMatch>,
}

impl SearchEngine {
    /// Create a new search engine
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// The highlighted match, if any
    pub fn current(&self) -> Option<SearchMatch> {
        self.current
    }

    /// Next match after the previous one's start, or the first match in
    /// the document when there is no previous match.
    ///
    /// When nothing further matches the cursor goes back to
    /// [`SearchState::NotStarted`], so the following call starts over.
    pub fn find(&mut self, tree: &mut BoxTree, pattern: &str) -> Option<SearchMatch> {
        let from = self
            .current
            .filter(|_| self.state == SearchState::Found)
            .map(|found| (found.container, found.range.start + 1));
        self.search_from(tree, pattern, from)
    }

    /// Re-run the search for an edited pattern, keeping the current match
    /// when it still matches
    pub fn refine(&mut self, tree: &mut BoxTree, pattern: &str) -> Option<SearchMatch> {
        let from = self
            .current
            .filter(|_| self.state == SearchState::Found)
            .map(|found| (found.container, found.range.start));
        self.search_from(tree, pattern, from)
    }

    /// Drop the current match and its highlight
    pub fn cancel(&mut self, tree: &mut BoxTree) {
        self.clear_highlight(tree);
        self.state = SearchState::NotStarted;
        self.current = None;
    }

    fn search_from(
        &mut self,
        tree: &mut BoxTree,
        pattern: &str,
        from: Option<(NodeId, usize)>,
    ) -> Option<SearchMatch> {
        self.clear_highlight(tree);
        let needle: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
        if needle.is_empty() {
            self.state = SearchState::NotStarted;
            self.current = None;
            return None;
        }

        self.state = SearchState::Scanning;
        let containers = tree.inline_containers();
        let (first, offset) = from
            .and_then(|(container, offset)| {
                containers
                    .iter()
                    .position(|id| *id == container)
                    .map(|index| (index, offset))
            })
            .unwrap_or((0, 0));

        for (index, id) in containers.iter().enumerate().skip(first) {
            let Some(inline) = tree.inline_mut(*id) else {
                continue;
            };
            let start = if index == first { offset } else { 0 };
            if let Some(range) = find_in(&inline.text(), &needle, start) {
                inline.highlight = range;
                let found = SearchMatch {
                    container: *id,
                    range,
                };
                self.state = SearchState::Found;
                self.current = Some(found);
                debug!(container = %id, start = range.start, "Search match");
                return Some(found);
            }
        }

        debug!(pattern, "Search reached the end of the document");
        self.state = SearchState::NotStarted;
        self.current = None;
        None
    }

    fn clear_highlight(&self, tree: &mut BoxTree) {
        if let Some(found) = self.current {
            if let Some(inline) = tree.inline_mut(found.container) {
                inline.highlight = TextRange::default();
            }
        }
    }
}

/// First case-insensitive occurrence of `needle` (already lowercased)
/// starting at or after byte offset `from`
pub fn find_in(text: &str, needle: &[char], from: usize) -> Option<TextRange> {
    if needle.is_empty() {
        return None;
    }

    // Lowercased characters, each tagged with its source character's offset
    let lowered: Vec<(usize, char)> = text
        .char_indices()
        .flat_map(|(offset, ch)| ch.to_lowercase().map(move |lower| (offset, lower)))
        .collect();

    for start in 0..lowered.len() {
        let (offset, _) = lowered[start];
        let first_of_char = start == 0 || lowered[start - 1].0 != offset;
        if offset < from || !first_of_char {
            continue;
        }
        let Some(window) = lowered.get(start..start + needle.len()) else {
            break;
        };
        if window.iter().map(|(_, ch)| ch).eq(needle.iter()) {
            let last = window[window.len() - 1].0;
            let end = text[last..]
                .chars()
                .next()
                .map_or(text.len(), |ch| last + ch.len_utf8());
            return Some(TextRange::new(offset, end));
        }
    }
    None
}
