//! Shaped-text cache
//!
//! Documents repeat the same words with the same styling over and over, so
//! every shaped word is kept for the life of the process and handed out as a
//! shared [`ShapedTextHandle`]. Entries are never evicted.

use crate::{EstimatingShaper, ShapedText, Shaper, SpanRuns, StyleSpan};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to a cached shaped word
pub type ShapedTextHandle = Arc<ShapedText>;

/// Cache key: the word and the canonical form of its styling
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapedTextKey {
    text: String,
    runs: SpanRuns,
}

impl ShapedTextKey {
    pub fn new(text: &str, spans: &[StyleSpan]) -> Self {
        Self {
            text: text.to_string(),
            runs: SpanRuns::from_spans(spans, text.len()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &SpanRuns {
        &self.runs
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl RunCacheStats {
    /// Get the hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Process-wide cache of shaped words
pub struct TextRunCache {
    shaper: Box<dyn Shaper>,
    entries: HashMap<ShapedTextKey, ShapedTextHandle>,
    stats: RunCacheStats,
}

impl TextRunCache {
    /// Create a new empty cache that shapes through `shaper`
    pub fn new(shaper: Box<dyn Shaper>) -> Self {
        Self {
            shaper,
            entries: HashMap::new(),
            stats: RunCacheStats::default(),
        }
    }

    /// Return the shaped form of `text` under `spans`, shaping it on a miss.
    ///
    /// Equal keys always yield the same handle.
    pub fn get(&mut self, text: &str, spans: &[StyleSpan]) -> ShapedTextHandle {
        let key = ShapedTextKey::new(text, spans);
        if let Some(handle) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(handle);
        }

        self.stats.misses += 1;
        let handle = Arc::new(self.shaper.shape(key.text(), key.runs()));
        tracing::trace!(text, width = handle.width(), "shaped new word");
        self.entries.insert(key, Arc::clone(&handle));
        handle
    }

    /// The shaper this cache measures with
    pub fn shaper(&self) -> &dyn Shaper {
        self.shaper.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> RunCacheStats {
        self.stats
    }
}

impl Default for TextRunCache {
    fn default() -> Self {
        Self::new(Box::new(EstimatingShaper::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FontSlant, FontWeight, StyleAttr};

    #[test]
    fn test_equal_keys_share_handle() {
        let mut cache = TextRunCache::default();
        let bold = StyleSpan::open(StyleAttr::Weight(FontWeight::Bold), 0);
        let first = cache.get("hello", &[bold]);
        let second = cache.get("hello", &[bold]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), RunCacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_span_order_does_not_matter() {
        let mut cache = TextRunCache::default();
        let bold = StyleSpan::closed(StyleAttr::Weight(FontWeight::Bold), 0, 3);
        let italic = StyleSpan::open(StyleAttr::Slant(FontSlant::Italic), 1);
        let first = cache.get("abcd", &[bold, italic]);
        let second = cache.get("abcd", &[italic, bold]);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_different_styles_are_distinct() {
        let mut cache = TextRunCache::default();
        let plain = cache.get("word", &[]);
        let bold = cache.get("word", &[StyleSpan::open(StyleAttr::Weight(FontWeight::Bold), 0)]);
        let other = cache.get("words", &[]);
        assert!(!Arc::ptr_eq(&plain, &bold));
        assert!(!Arc::ptr_eq(&plain, &other));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().hit_ratio(), 0.0);
    }

    #[test]
    fn test_span_past_word_end_is_ignored() {
        let mut cache = TextRunCache::default();
        let beyond = StyleSpan::open(StyleAttr::Underline, 4);
        let first = cache.get("word", &[beyond]);
        let second = cache.get("word", &[]);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
