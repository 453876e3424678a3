//! Text shaping seam
//!
//! Real glyph shaping lives behind the [`Shaper`] trait. The crate ships
//! [`EstimatingShaper`], which measures text from per-character width
//! estimates and is what the headless driver and the tests use.

use crate::{FontFamily, FontWeight, Result, SpanRuns, TextError};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A caret position within a shaped run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretStop {
    /// Byte offset into the run's text
    pub offset: usize,
    /// Horizontal distance from the run's origin
    pub x: f32,
}

/// A shaped word with its extents
#[derive(Debug, Clone)]
pub struct ShapedText {
    text: String,
    runs: SpanRuns,
    width: f32,
    height: f32,
    baseline: f32,
    /// One stop per grapheme boundary, including both ends
    carets: Vec<CaretStop>,
}

impl ShapedText {
    /// Create a new shaped text from measured extents.
    ///
    /// `carets` must be sorted by offset; stops are added at both ends of the
    /// text when missing.
    pub fn new(
        text: impl Into<String>,
        runs: SpanRuns,
        width: f32,
        height: f32,
        baseline: f32,
        mut carets: Vec<CaretStop>,
    ) -> Self {
        let text = text.into();
        if carets.first().map_or(true, |stop| stop.offset != 0) {
            carets.insert(0, CaretStop { offset: 0, x: 0.0 });
        }
        if carets.last().map_or(true, |stop| stop.offset != text.len()) {
            carets.push(CaretStop {
                offset: text.len(),
                x: width,
            });
        }
        Self {
            text,
            runs,
            width,
            height,
            baseline,
            carets,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &SpanRuns {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Distance from the top of the run to its baseline
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// True for the collapsed single space the builder emits between words
    pub fn is_single_space(&self) -> bool {
        self.text == " "
    }

    /// Get the x position at a specific byte offset
    pub fn x_at_offset(&self, offset: usize) -> f32 {
        self.carets
            .iter()
            .take_while(|stop| stop.offset <= offset)
            .last()
            .map_or(0.0, |stop| stop.x)
    }

    /// Byte offset of the caret stop closest to `x`
    pub fn offset_at_x(&self, x: f32) -> usize {
        for pair in self.carets.windows(2) {
            if x < (pair[0].x + pair[1].x) / 2.0 {
                return pair[0].offset;
            }
        }
        self.text.len()
    }

    /// Text between two byte offsets of this run
    pub fn slice(&self, start: usize, end: usize) -> Result<&str> {
        self.text.get(start..end).ok_or(TextError::InvalidOffset {
            offset: if self.text.is_char_boundary(start) { end } else { start },
            len: self.text.len(),
        })
    }
}

/// The shaping engine seam
pub trait Shaper {
    /// Shape `text` styled by `runs`
    fn shape(&self, text: &str, runs: &SpanRuns) -> ShapedText;

    /// Byte offset under a point relative to the run's top-left corner
    fn coordinate_to_offset(&self, shaped: &ShapedText, x: f32, _y: f32) -> usize {
        shaped.offset_at_x(x)
    }

    /// Horizontal position of a byte offset relative to the run's origin
    fn offset_to_x(&self, shaped: &ShapedText, offset: usize) -> f32 {
        shaped.x_at_offset(offset)
    }
}

/// Configuration for the estimating shaper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaperConfig {
    /// Base font size in pixels
    pub font_size: f32,
    /// Ascent as a fraction of the font size
    pub ascent: f32,
    /// Descent as a fraction of the font size
    pub descent: f32,
    /// Extra advance for bold text as a fraction of the regular advance
    pub bold_widening: f32,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            ascent: 0.8,
            descent: 0.2,
            bold_widening: 0.1,
        }
    }
}

impl ShaperConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.font_size > 0.0) {
            return Err(TextError::InvalidConfig(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.ascent < 0.0 || self.descent < 0.0 {
            return Err(TextError::InvalidConfig(
                "ascent and descent must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Shaper that estimates advances from character classes
#[derive(Debug, Clone, Default)]
pub struct EstimatingShaper {
    config: ShaperConfig,
}

impl EstimatingShaper {
    /// Create a new estimating shaper
    pub fn new(config: ShaperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    /// Estimate a character's advance as a fraction of the em
    fn estimate_char_width(ch: char, family: FontFamily) -> f32 {
        if family == FontFamily::Monospace {
            return match ch {
                '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{00AD}' => 0.0,
                _ => 0.6,
            };
        }
        match ch {
            ' ' | 'i' | 'l' | 'j' | 't' | 'f' | 'r' | '!' | '|' | '\'' | '`' | '.' | ','
            | ':' | ';' => 0.30,
            'I' | '1' => 0.35,
            'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.90,
            'A'..='Z' => 0.70,
            'a'..='z' => 0.55,
            '0'..='9' => 0.60,
            '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' => 1.0,
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{00AD}' => 0.0,
            '\u{00A0}' => 0.30,
            _ => 0.60,
        }
    }
}

impl Shaper for EstimatingShaper {
    fn shape(&self, text: &str, runs: &SpanRuns) -> ShapedText {
        let config = &self.config;
        let plain = runs.style_at(usize::MAX);
        let mut ascent = config.font_size * plain.scale * config.ascent;
        let mut descent = config.font_size * plain.scale * config.descent;
        let mut carets = Vec::with_capacity(text.len() + 1);
        let mut x = 0.0;

        for (offset, grapheme) in text.grapheme_indices(true) {
            carets.push(CaretStop { offset, x });
            let style = runs.style_at(offset);
            let size = config.font_size * style.scale;
            let mut advance = grapheme
                .chars()
                .next()
                .map_or(0.0, |ch| Self::estimate_char_width(ch, style.family))
                * size;
            if style.weight != FontWeight::Normal {
                advance *= 1.0 + config.bold_widening;
            }
            x += advance;
            ascent = ascent.max(size * config.ascent + style.rise);
            descent = descent.max(size * config.descent - style.rise);
        }

        ShapedText::new(text, runs.clone(), x, ascent + descent, ascent, carets)
    }
}
