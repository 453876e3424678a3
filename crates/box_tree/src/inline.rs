//! Inline containers and their items

use crate::{LinkId, NodeId, Rect};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use text_engine::ShapedTextHandle;

/// A half-open byte range of a container's text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Overlap with `[start, end)`, if any
    pub fn intersect(&self, start: usize, end: usize) -> Option<TextRange> {
        let range = TextRange::new(self.start.max(start), self.end.min(end));
        (!range.is_empty()).then_some(range)
    }
}

/// A caret position: a container and a byte offset into its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub container: NodeId,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A shaped word placed in an inline container
#[derive(Debug, Clone)]
pub struct TextRun {
    pub shaped: ShapedTextHandle,
    /// Offset of the run's first byte in the container's text
    pub offset: usize,
    /// Placement from the last layout pass
    pub rect: Rect,
}

impl TextRun {
    pub fn len(&self) -> usize {
        self.shaped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaped.is_empty()
    }

    pub fn text(&self) -> &str {
        self.shaped.text()
    }

    /// Container offsets covered by this run
    pub fn range(&self) -> TextRange {
        TextRange::new(self.offset, self.offset + self.len())
    }
}

/// An item of an inline container's flow
#[derive(Debug, Clone)]
pub enum InlineItem {
    Text(TextRun),
    /// An embedded object child of the container
    Object(NodeId),
    /// Forced line break
    Break,
}

impl InlineItem {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            InlineItem::Text(run) => Some(run),
            _ => None,
        }
    }
}

/// A line produced by inline layout
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// Items placed on this line
    pub items: Range<usize>,
    pub rect: Rect,
    /// Baseline distance from the top of the line
    pub baseline: f32,
}

/// A container of text runs, embedded objects, and forced breaks
#[derive(Debug, Clone)]
pub struct InlineBox {
    /// False for preformatted text, which never wraps automatically
    pub wrap: bool,
    items: Vec<InlineItem>,
    text_len: usize,
    /// Links anchored in this container, in creation order
    pub links: Vec<LinkId>,
    pub selection: TextRange,
    /// Current find match, drawn distinctly from the selection
    pub highlight: TextRange,
    /// Lines from the last layout pass
    pub lines: Vec<LineBox>,
}

impl InlineBox {
    /// Create a new empty container
    pub fn new(wrap: bool) -> Self {
        Self {
            wrap,
            items: Vec::new(),
            text_len: 0,
            links: Vec::new(),
            selection: TextRange::default(),
            highlight: TextRange::default(),
            lines: Vec::new(),
        }
    }

    pub fn items(&self) -> &[InlineItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [InlineItem] {
        &mut self.items
    }

    /// Append a shaped word and return its item index
    pub fn push_text(&mut self, shaped: ShapedTextHandle) -> usize {
        let len = shaped.len();
        self.items.push(InlineItem::Text(TextRun {
            shaped,
            offset: self.text_len,
            rect: Rect::default(),
        }));
        self.text_len += len;
        self.items.len() - 1
    }

    pub(crate) fn push_object(&mut self, id: NodeId) -> usize {
        self.items.push(InlineItem::Object(id));
        self.items.len() - 1
    }

    pub fn push_break(&mut self) {
        self.items.push(InlineItem::Break);
    }

    /// Total text length in bytes; objects and breaks contribute nothing
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.items.iter().filter_map(InlineItem::as_text)
    }

    /// Concatenated text of every run
    pub fn text(&self) -> String {
        self.text_runs().map(TextRun::text).collect()
    }

    /// Object children in flow order
    pub fn objects(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().filter_map(|item| match item {
            InlineItem::Object(id) => Some(*id),
            _ => None,
        })
    }

    /// Text between two container offsets, clipped to run boundaries
    pub fn text_in(&self, range: TextRange) -> String {
        let mut out = String::new();
        for run in self.text_runs() {
            if let Some(overlap) = run.range().intersect(range.start, range.end) {
                if let Ok(part) = run
                    .shaped
                    .slice(overlap.start - run.offset, overlap.end - run.offset)
                {
                    out.push_str(part);
                }
            }
        }
        out
    }
}
