//! Open and recently closed style spans of the pending word

use text_engine::{AttrKind, StyleAttr, StyleSpan};

/// Style spans relative to the start of the pending word.
///
/// Spans are opened at the pending word's current length and closed the
/// same way. Each time a word is emitted the spans are shifted so they stay
/// relative to the next word.
#[derive(Debug, Clone, Default)]
pub struct SpanStack {
    spans: Vec<StyleSpan>,
}

impl SpanStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[StyleSpan] {
        &self.spans
    }

    pub fn open(&mut self, attr: StyleAttr, at: usize) {
        self.spans.push(StyleSpan::open(attr, at));
    }

    /// End every open span of `kind` at `at`
    pub fn close(&mut self, kind: AttrKind, at: usize) {
        for span in self.spans.iter_mut() {
            if span.is_open() && span.attr.kind() == kind {
                span.end = Some(at.max(span.start));
            }
        }
    }

    /// Drop spans that ended within the first `len` bytes and rebase the rest
    pub fn shift(&mut self, len: usize) {
        self.spans.retain(|span| span.end.map_or(true, |end| end > len));
        for span in self.spans.iter_mut() {
            span.start = span.start.saturating_sub(len);
            if let Some(end) = span.end.as_mut() {
                *end -= len;
            }
        }
    }
}
