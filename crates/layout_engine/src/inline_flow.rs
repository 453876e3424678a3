//! Inline Flow Layout
//!
//! Places an inline container's items into lines:
//! 1. Break greedily: an item that does not fit in the remaining width
//!    starts a new line, unless it is already first on its line
//! 2. Forced breaks always end the current line
//! 3. Align text on each line to the line's largest baseline; embedded
//!    objects sit at the top of the line
//!
//! A lone space that lands first on a line of a wrapping container takes
//! no room, but keeps its text offsets.

use box_tree::{LineBox, Rect};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Minimum and natural size along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeRequest {
    pub minimum: f32,
    pub natural: f32,
}

impl SizeRequest {
    pub fn new(minimum: f32, natural: f32) -> Self {
        Self { minimum, natural }
    }

    /// Both sizes equal
    pub fn fixed(size: f32) -> Self {
        Self::new(size, size)
    }
}

/// The measurements of one inline item that flow layout needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowItem {
    Text {
        width: f32,
        height: f32,
        /// Distance from the item's top to its baseline
        baseline: f32,
        single_space: bool,
    },
    Object {
        width: f32,
        height: f32,
    },
    /// An invisible object; takes no room and is never placed
    Hidden,
    Break,
}

impl FlowItem {
    pub fn width(&self) -> f32 {
        match self {
            FlowItem::Text { width, .. } | FlowItem::Object { width, .. } => *width,
            FlowItem::Hidden | FlowItem::Break => 0.0,
        }
    }
}

/// Result of flowing a container, relative to its top-left corner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    /// One rect per input item; `None` for breaks and hidden objects
    pub placements: Vec<Option<Rect>>,
    pub lines: Vec<LineBox>,
    pub height: f32,
}

/// Flows items into lines of a fixed width
#[derive(Debug, Clone, Copy)]
pub struct InlineFlow {
    wrap: bool,
    /// Height given to a line with nothing on it when no earlier line exists
    empty_line_height: f32,
}

impl InlineFlow {
    /// Create a new flow for a wrapping or preformatted container
    pub fn new(wrap: bool, empty_line_height: f32) -> Self {
        Self {
            wrap,
            empty_line_height,
        }
    }

    /// Width requests: the widest item when wrapping, otherwise every item
    /// side by side; the natural width is the longest run between breaks
    pub fn preferred_width(&self, items: &[FlowItem]) -> SizeRequest {
        let mut minimum: f32 = 0.0;
        let mut natural: f32 = 0.0;
        let mut total = 0.0;
        let mut current = 0.0;

        for item in items {
            match item {
                FlowItem::Break => {
                    natural = natural.max(current);
                    current = 0.0;
                }
                FlowItem::Hidden => {}
                _ => {
                    let width = item.width();
                    minimum = minimum.max(width);
                    total += width;
                    current += width;
                }
            }
        }
        natural = natural.max(current);

        if !self.wrap {
            minimum = total;
        }
        SizeRequest::new(minimum, natural)
    }

    /// Lay out `items` within `width`
    pub fn layout(&self, items: &[FlowItem], width: f32) -> FlowLayout {
        let (lines, collapsed) = self.break_lines(items, width);
        let mut placements = vec![None; items.len()];
        let mut line_boxes = Vec::with_capacity(lines.len());
        let mut y = 0.0;
        let mut previous_height = None;

        for range in lines {
            let baseline = items[range.clone()]
                .iter()
                .filter_map(|item| match item {
                    FlowItem::Text { baseline, .. } => Some(*baseline),
                    _ => None,
                })
                .fold(0.0_f32, f32::max);

            let mut x = 0.0;
            let mut height: Option<f32> = None;
            for index in range.clone() {
                match items[index] {
                    FlowItem::Text {
                        width,
                        height: item_height,
                        baseline: own,
                        ..
                    } => {
                        let offset = baseline - own;
                        if collapsed[index] {
                            placements[index] = Some(Rect::new(x, y + offset, 0.0, item_height));
                            continue;
                        }
                        placements[index] = Some(Rect::new(x, y + offset, width, item_height));
                        x += width;
                        height = Some(height.unwrap_or(0.0).max(offset + item_height));
                    }
                    FlowItem::Object {
                        width,
                        height: item_height,
                    } => {
                        placements[index] = Some(Rect::new(x, y, width, item_height));
                        x += width;
                        height = Some(height.unwrap_or(0.0).max(item_height));
                    }
                    FlowItem::Hidden | FlowItem::Break => {}
                }
            }

            // Empty lines repeat the previous line's height
            let height = height
                .or(previous_height)
                .unwrap_or(self.empty_line_height);
            line_boxes.push(LineBox {
                items: range,
                rect: Rect::new(0.0, y, x, height),
                baseline,
            });
            previous_height = Some(height);
            y += height;
        }

        FlowLayout {
            placements,
            lines: line_boxes,
            height: y,
        }
    }

    /// Greedy line breaking. Returns item ranges per line, and which items
    /// are leading spaces collapsed to zero width.
    fn break_lines(&self, items: &[FlowItem], width: f32) -> (Vec<Range<usize>>, Vec<bool>) {
        let mut lines = Vec::new();
        let mut collapsed = vec![false; items.len()];
        let mut start = 0;
        let mut x: f32 = 0.0;

        for (index, item) in items.iter().enumerate() {
            let item_width = match item {
                FlowItem::Break => {
                    lines.push(start..index + 1);
                    start = index + 1;
                    x = 0.0;
                    continue;
                }
                FlowItem::Hidden => continue,
                _ => item.width(),
            };

            if self.wrap && x > 0.0 && x + item_width > width {
                lines.push(start..index);
                start = index;
                x = 0.0;
            }

            let single_space = matches!(item, FlowItem::Text { single_space: true, .. });
            if self.wrap && single_space && x <= 0.0 {
                collapsed[index] = true;
                continue;
            }
            x += item_width;
        }

        if items[start..].iter().any(|item| *item != FlowItem::Hidden) {
            lines.push(start..items.len());
        }
        (lines, collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn word(width: f32, height: f32, baseline: f32) -> FlowItem {
        FlowItem::Text {
            width,
            height,
            baseline,
            single_space: false,
        }
    }

    fn space(width: f32) -> FlowItem {
        FlowItem::Text {
            width,
            height: 20.0,
            baseline: 16.0,
            single_space: true,
        }
    }

    #[test]
    fn test_greedy_wrap_two_lines() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [word(40.0, 20.0, 16.0), word(40.0, 30.0, 24.0), word(40.0, 20.0, 16.0)];
        let layout = flow.layout(&items, 100.0);

        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.lines[0].items, 0..2);
        assert_eq!(layout.lines[1].items, 2..3);

        // First line aligns to the taller word's baseline
        assert_eq!(layout.lines[0].baseline, 24.0);
        let first = layout.placements[0].unwrap();
        let second = layout.placements[1].unwrap();
        assert_eq!(first.y + 16.0, second.y + 24.0);
        assert_eq!(first.y, 8.0);
        assert_eq!(layout.lines[0].rect.height, 30.0);

        let third = layout.placements[2].unwrap();
        assert_eq!(third.x, 0.0);
        assert_eq!(third.y, 30.0);
        assert_eq!(layout.height, 50.0);
    }

    #[test]
    fn test_no_wrap_keeps_one_line() {
        let flow = InlineFlow::new(false, 16.0);
        let items = [word(40.0, 20.0, 16.0); 3];
        let layout = flow.layout(&items, 100.0);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.placements[2].unwrap().x, 80.0);
    }

    #[test]
    fn test_oversized_item_placed_alone() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [word(150.0, 20.0, 16.0), word(10.0, 20.0, 16.0)];
        let layout = flow.layout(&items, 100.0);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.placements[0].unwrap().x, 0.0);
    }

    #[test]
    fn test_forced_break_and_empty_line() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [
            word(10.0, 20.0, 16.0),
            FlowItem::Break,
            FlowItem::Break,
            word(10.0, 20.0, 16.0),
        ];
        let layout = flow.layout(&items, 100.0);
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.lines[1].rect.height, 20.0);
        assert_eq!(layout.placements[3].unwrap().y, 40.0);
        assert!(layout.placements[1].is_none());
    }

    #[test]
    fn test_leading_space_collapsed_after_wrap() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [word(60.0, 20.0, 16.0), space(5.0), word(60.0, 20.0, 16.0)];
        let layout = flow.layout(&items, 62.0);

        // The space wraps onto line two, where it takes no room
        assert_eq!(layout.lines.len(), 2);
        let space_rect = layout.placements[1].unwrap();
        assert_eq!(space_rect.width, 0.0);
        assert_eq!(layout.placements[2].unwrap().x, 0.0);
        assert_eq!(layout.lines[1].items, 1..3);
    }

    #[test]
    fn test_space_kept_in_preformatted() {
        let flow = InlineFlow::new(false, 16.0);
        let items = [space(5.0), word(10.0, 20.0, 16.0)];
        let layout = flow.layout(&items, 100.0);
        assert_eq!(layout.placements[1].unwrap().x, 5.0);
    }

    #[test]
    fn test_objects_top_aligned() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [word(10.0, 20.0, 16.0), FlowItem::Object { width: 30.0, height: 50.0 }];
        let layout = flow.layout(&items, 100.0);
        assert_eq!(layout.placements[1].unwrap().y, 0.0);
        assert_eq!(layout.placements[0].unwrap().y, 0.0);
        assert_eq!(layout.height, 50.0);
    }

    #[test]
    fn test_hidden_items_take_no_room() {
        let flow = InlineFlow::new(true, 16.0);
        let items = [FlowItem::Hidden, word(10.0, 20.0, 16.0)];
        let layout = flow.layout(&items, 100.0);
        assert!(layout.placements[0].is_none());
        assert_eq!(layout.placements[1].unwrap().x, 0.0);
    }

    #[test]
    fn test_preferred_width() {
        let items = [
            word(40.0, 20.0, 16.0),
            word(30.0, 20.0, 16.0),
            FlowItem::Break,
            word(50.0, 20.0, 16.0),
        ];
        let wrapping = InlineFlow::new(true, 16.0).preferred_width(&items);
        assert_eq!(wrapping, SizeRequest::new(50.0, 70.0));

        let preformatted = InlineFlow::new(false, 16.0).preferred_width(&items);
        assert_eq!(preformatted, SizeRequest::new(120.0, 70.0));
    }

    #[test]
    fn test_empty_container() {
        let layout = InlineFlow::new(true, 16.0).layout(&[], 100.0);
        assert!(layout.lines.is_empty());
        assert_eq!(layout.height, 0.0);
    }

    proptest! {
        #[test]
        fn test_lines_fit_unless_single_item(
            widths in proptest::collection::vec(1.0f32..80.0, 0..40),
            width in 20.0f32..300.0,
        ) {
            let items: Vec<FlowItem> = widths.iter().map(|w| word(*w, 20.0, 16.0)).collect();
            let layout = InlineFlow::new(true, 16.0).layout(&items, width);
            for line in &layout.lines {
                if line.items.len() > 1 {
                    prop_assert!(line.rect.width <= width + 0.001);
                }
            }
            let placed: usize = layout.lines.iter().map(|line| line.items.len()).sum();
            prop_assert_eq!(placed, items.len());
        }

        #[test]
        fn test_layout_is_idempotent(
            widths in proptest::collection::vec(1.0f32..80.0, 0..20),
            width in 20.0f32..300.0,
        ) {
            let items: Vec<FlowItem> = widths.iter().map(|w| word(*w, 20.0, 16.0)).collect();
            let flow = InlineFlow::new(true, 16.0);
            prop_assert_eq!(flow.layout(&items, width), flow.layout(&items, width));
        }
    }
}
