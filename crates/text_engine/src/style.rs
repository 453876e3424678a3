//! Style attributes and attribute spans
//!
//! A word is styled by a list of [`StyleSpan`]s whose offsets are relative to
//! the start of the word. Two span lists describe the same styling when every
//! byte of the word sees the same set of active attributes, regardless of the
//! order in which the spans were opened. [`SpanRuns`] is that canonical form
//! and is what the shaped-text cache keys on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    SemiBold,
    Bold,
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FontSlant {
    Normal,
    Italic,
}

/// Font family class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Proportional,
    Monospace,
}

/// 24-bit RGB colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default colour for hyperlink text
    pub const LINK: Color = Color::rgb(0x1a, 0x0d, 0xab);
}

/// A single style attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StyleAttr {
    Weight(FontWeight),
    Slant(FontSlant),
    Family(FontFamily),
    /// Baseline shift in pixels; positive raises the text
    Rise(i32),
    /// Font scale in percent of the base size
    Scale(u16),
    Foreground(Color),
    Underline,
}

/// Attribute kind, used to close every open span of one kind at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Weight,
    Slant,
    Family,
    Rise,
    Scale,
    Foreground,
    Underline,
}

impl StyleAttr {
    pub fn kind(&self) -> AttrKind {
        match self {
            StyleAttr::Weight(_) => AttrKind::Weight,
            StyleAttr::Slant(_) => AttrKind::Slant,
            StyleAttr::Family(_) => AttrKind::Family,
            StyleAttr::Rise(_) => AttrKind::Rise,
            StyleAttr::Scale(_) => AttrKind::Scale,
            StyleAttr::Foreground(_) => AttrKind::Foreground,
            StyleAttr::Underline => AttrKind::Underline,
        }
    }
}

/// An attribute applied over `[start, end)` of the pending word.
///
/// `end == None` means the span is still open and extends to the end of
/// whatever text it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub attr: StyleAttr,
    pub start: usize,
    pub end: Option<usize>,
}

impl StyleSpan {
    /// Create a new open span starting at `start`
    pub fn open(attr: StyleAttr, start: usize) -> Self {
        Self { attr, start, end: None }
    }

    /// Create a new closed span
    pub fn closed(attr: StyleAttr, start: usize, end: usize) -> Self {
        Self {
            attr,
            start,
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Whether the byte at `pos` is styled by this span
    pub fn covers(&self, pos: usize) -> bool {
        pos >= self.start && self.end.map_or(true, |end| pos < end)
    }
}

/// A maximal byte range that sees one set of active attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledRange {
    pub start: usize,
    pub end: usize,
    pub attrs: BTreeSet<StyleAttr>,
}

/// Canonical form of a span list applied to a text of known length.
///
/// Unstyled ranges are omitted and adjacent ranges with equal attribute
/// sets are merged, so equality and hashing ignore span order and how the
/// spans happened to be split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SpanRuns(Vec<StyledRange>);

impl SpanRuns {
    /// Canonicalize `spans` over a text of `len` bytes
    pub fn from_spans(spans: &[StyleSpan], len: usize) -> Self {
        let mut bounds = vec![0, len];
        for span in spans {
            bounds.push(span.start.min(len));
            if let Some(end) = span.end {
                bounds.push(end.min(len));
            }
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut runs: Vec<StyledRange> = Vec::new();
        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let attrs: BTreeSet<StyleAttr> = spans
                .iter()
                .filter(|span| span.covers(start))
                .map(|span| span.attr)
                .collect();
            if attrs.is_empty() {
                continue;
            }
            match runs.last_mut() {
                Some(last) if last.end == start && last.attrs == attrs => last.end = end,
                _ => runs.push(StyledRange { start, end, attrs }),
            }
        }
        Self(runs)
    }

    pub fn ranges(&self) -> &[StyledRange] {
        &self.0
    }

    /// True when no attribute applies anywhere
    pub fn is_plain(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolved style of the byte at `pos`
    pub fn style_at(&self, pos: usize) -> ResolvedStyle {
        self.0
            .iter()
            .find(|range| pos >= range.start && pos < range.end)
            .map(|range| ResolvedStyle::from_attrs(&range.attrs))
            .unwrap_or_default()
    }
}

/// Style resolved from every attribute active on a range.
///
/// Resolution is independent of attribute order: scales multiply, rises
/// add, and the heaviest weight wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub family: FontFamily,
    pub rise: f32,
    pub scale: f32,
    pub foreground: Option<Color>,
    pub underline: bool,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            family: FontFamily::Proportional,
            rise: 0.0,
            scale: 1.0,
            foreground: None,
            underline: false,
        }
    }
}

impl ResolvedStyle {
    pub fn from_attrs<'a>(attrs: impl IntoIterator<Item = &'a StyleAttr>) -> Self {
        let mut style = Self::default();
        for attr in attrs {
            match *attr {
                StyleAttr::Weight(weight) => style.weight = style.weight.max(weight),
                StyleAttr::Slant(slant) => style.slant = slant,
                StyleAttr::Family(family) => style.family = family,
                StyleAttr::Rise(px) => style.rise += px as f32,
                StyleAttr::Scale(percent) => style.scale *= percent as f32 / 100.0,
                StyleAttr::Foreground(color) => style.foreground = Some(color),
                StyleAttr::Underline => style.underline = true,
            }
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bold() -> StyleAttr {
        StyleAttr::Weight(FontWeight::Bold)
    }

    fn italic() -> StyleAttr {
        StyleAttr::Slant(FontSlant::Italic)
    }

    #[test]
    fn test_open_span_covers_to_end() {
        let span = StyleSpan::open(bold(), 2);
        assert!(!span.covers(1));
        assert!(span.covers(2));
        assert!(span.covers(10_000));
    }

    #[test]
    fn test_unstyled_text_is_plain() {
        assert!(SpanRuns::from_spans(&[], 5).is_plain());
        // A span closed where it opened styles nothing
        let empty = StyleSpan::closed(bold(), 0, 0);
        assert!(SpanRuns::from_spans(&[empty], 5).is_plain());
    }

    #[test]
    fn test_split_spans_merge() {
        let whole = [StyleSpan::closed(bold(), 0, 4)];
        let split = [StyleSpan::closed(bold(), 0, 2), StyleSpan::closed(bold(), 2, 4)];
        assert_eq!(
            SpanRuns::from_spans(&whole, 4),
            SpanRuns::from_spans(&split, 4)
        );
    }

    #[test]
    fn test_open_span_is_clamped_to_text() {
        let open = [StyleSpan::open(bold(), 1)];
        let closed = [StyleSpan::closed(bold(), 1, 3)];
        assert_eq!(
            SpanRuns::from_spans(&open, 3),
            SpanRuns::from_spans(&closed, 3)
        );
    }

    #[test]
    fn test_different_boundaries_differ() {
        let a = [StyleSpan::closed(bold(), 0, 2)];
        let b = [StyleSpan::closed(bold(), 0, 3)];
        assert_ne!(SpanRuns::from_spans(&a, 4), SpanRuns::from_spans(&b, 4));
    }

    #[test]
    fn test_resolved_style_combines_attributes() {
        let runs = SpanRuns::from_spans(
            &[
                StyleSpan::open(StyleAttr::Scale(180), 0),
                StyleSpan::open(StyleAttr::Scale(80), 0),
                StyleSpan::open(StyleAttr::Weight(FontWeight::SemiBold), 0),
                StyleSpan::open(bold(), 0),
                StyleSpan::open(StyleAttr::Rise(5), 0),
            ],
            3,
        );
        let style = runs.style_at(1);
        assert!((style.scale - 1.44).abs() < 1e-4);
        assert_eq!(style.weight, FontWeight::Bold);
        assert_eq!(style.rise, 5.0);
        assert_eq!(runs.style_at(3), ResolvedStyle::default());
    }

    proptest! {
        #[test]
        fn test_canonical_form_ignores_span_order(
            raw in prop::collection::vec((0usize..8, 0usize..8, any::<bool>()), 0..6),
            len in 0usize..10,
        ) {
            let spans: Vec<StyleSpan> = raw
                .iter()
                .map(|&(a, b, is_bold)| {
                    let attr = if is_bold { bold() } else { italic() };
                    StyleSpan::closed(attr, a.min(b), a.max(b))
                })
                .collect();
            let mut reversed = spans.clone();
            reversed.reverse();
            prop_assert_eq!(
                SpanRuns::from_spans(&spans, len),
                SpanRuns::from_spans(&reversed, len)
            );
        }
    }
}
