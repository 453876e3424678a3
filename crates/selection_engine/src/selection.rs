//! Drag selection model
//!
//! A selection is anchored at two caret positions that may sit in different
//! containers. While dragging, only containers near the start, the end, or
//! the previous end are revisited; everything else keeps its range.

use box_tree::{BoxTree, InlineItem, NodeId, Rect, TextPosition, TextRange};
use std::cmp::Ordering;
use tracing::trace;

/// Selection anchors and drag state
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    start: Option<TextPosition>,
    end: Option<TextPosition>,
    previous_end: Option<TextPosition>,
    active: bool,
}

impl SelectionModel {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&self) -> Option<TextPosition> {
        self.start
    }

    pub fn end(&self) -> Option<TextPosition> {
        self.end
    }

    /// Begin a drag at `anchor`, dropping any earlier selection
    pub fn start_drag(&mut self, tree: &mut BoxTree, anchor: TextPosition) {
        self.collapse(tree);
        self.start = Some(anchor);
        self.end = Some(anchor);
        self.previous_end = Some(anchor);
        self.active = true;
    }

    /// Move the drag's free end to `anchor`; ignored when no drag is active
    pub fn extend_to(&mut self, tree: &mut BoxTree, anchor: TextPosition) {
        if !self.active {
            return;
        }
        self.previous_end = self.end;
        self.end = Some(anchor);
        self.update(tree);
    }

    /// Finish the drag and return the selected text
    pub fn end_drag(&mut self, tree: &BoxTree) -> String {
        self.active = false;
        self.read(tree)
    }

    /// Select between two positions without a drag
    pub fn select(&mut self, tree: &mut BoxTree, start: TextPosition, end: TextPosition) {
        self.collapse(tree);
        self.start = Some(start);
        self.previous_end = Some(start);
        self.end = Some(end);
        self.update(tree);
    }

    /// Drop the selection from every container
    pub fn clear(&mut self, tree: &mut BoxTree) {
        for id in tree.inline_containers() {
            if let Some(inline) = tree.inline_mut(id) {
                inline.selection = TextRange::default();
            }
        }
        *self = Self::default();
    }

    /// Shrink the selection to its start, unmarking what it covered
    fn collapse(&mut self, tree: &mut BoxTree) {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            self.previous_end = Some(end);
            self.end = Some(start);
            self.update(tree);
        }
    }

    /// Recompute container ranges near the anchors
    fn update(&self, tree: &mut BoxTree) {
        let (Some(start), Some(end), Some(previous)) = (self.start, self.end, self.previous_end)
        else {
            return;
        };
        let start_rect = tree.bounds(start.container);
        let end_rect = tree.bounds(end.container);
        let previous_rect = tree.bounds(previous.container);

        let (first, last) = match reading_order(tree, start, end) {
            Ordering::Less => (Some(start), end),
            Ordering::Greater => (Some(end), start),
            Ordering::Equal => (None, end),
        };

        let mut selecting = false;
        let mut touched = 0;
        for id in tree.inline_containers() {
            let bounds = tree.bounds(id);
            let affected = is_affected(&bounds, &start_rect, &end_rect)
                || is_affected(&bounds, &start_rect, &previous_rect)
                || is_affected(&bounds, &end_rect, &previous_rect);
            if !affected {
                continue;
            }
            let Some(inline) = tree.inline_mut(id) else {
                continue;
            };

            let mut range = TextRange::default();
            if let Some(first) = first {
                if first.container == id {
                    range.start = first.offset;
                    selecting = true;
                }
                if selecting && last.container == id {
                    range.end = last.offset;
                    selecting = false;
                }
                if selecting {
                    range.end = inline.text_len();
                }
            }
            inline.selection = range;
            touched += 1;
        }
        trace!(touched, "Selection updated");
    }

    /// Selected text in reading order.
    ///
    /// Forced breaks inside the selection become newlines, and each
    /// container's text is followed by one; the final newline is dropped.
    pub fn read(&self, tree: &BoxTree) -> String {
        let mut out = String::new();
        for id in tree.inline_containers() {
            let Some(inline) = tree.inline(id) else {
                continue;
            };
            let selection = inline.selection;
            if selection.end == 0 {
                continue;
            }

            let mut affected = false;
            let mut after_text = false;
            for item in inline.items() {
                match item {
                    InlineItem::Text(run) => {
                        let range = run.range();
                        if selection.start <= range.end && selection.end > range.start {
                            let from = selection.start.max(range.start) - range.start;
                            let to = selection.end.min(range.end) - range.start;
                            if let Ok(part) = run.shaped.slice(from, to) {
                                out.push_str(part);
                            }
                            affected = true;
                            after_text = true;
                        } else {
                            after_text = false;
                        }
                    }
                    InlineItem::Break if after_text => {
                        out.push('\n');
                        after_text = false;
                    }
                    _ => {}
                }
            }
            if affected {
                out.push('\n');
            }
        }
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

/// Compare two positions by their container's place on screen, then by
/// offset
pub fn reading_order(tree: &BoxTree, a: TextPosition, b: TextPosition) -> Ordering {
    let a_rect = tree.bounds(a.container);
    let b_rect = tree.bounds(b.container);
    a_rect
        .y
        .total_cmp(&b_rect.y)
        .then(a_rect.x.total_cmp(&b_rect.x))
        .then(container_order(a.container, b.container))
        .then(a.offset.cmp(&b.offset))
}

/// Containers sharing a position keep document order
fn container_order(a: NodeId, b: NodeId) -> Ordering {
    a.index().cmp(&b.index())
}

/// A container needs revisiting when it overlaps either anchor's container
/// or sits vertically between them
fn is_affected(bounds: &Rect, first: &Rect, second: &Rect) -> bool {
    let (top, bottom) = if first.y <= second.y {
        (first.y, second.y)
    } else {
        (second.y, first.y)
    };
    bounds.intersects(first)
        || bounds.intersects(second)
        || (bounds.y >= top && bounds.y <= bottom)
}
