//! Whitespace collapsing

/// A piece of character data after whitespace processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPiece<'a> {
    /// Text that completes the pending word (possibly empty)
    WordEnd(&'a str),
    /// A single collapsed space
    Space,
    /// Forced line break from a newline in preformatted text
    Break,
    /// Trailing text that continues the pending word
    Partial(&'a str),
}

/// Collapsing state carried across character chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitespaceState {
    /// The last emitted piece was a space (or nothing yet)
    pub prev_space: bool,
    /// Preformatted text keeps every space and turns newlines into breaks
    pub preformatted: bool,
}

impl Default for WhitespaceState {
    fn default() -> Self {
        Self {
            prev_space: true,
            preformatted: false,
        }
    }
}

impl WhitespaceState {
    /// Split `text` into word ends, spaces, and breaks.
    ///
    /// Outside preformatted text a whitespace run becomes one space, and no
    /// space follows another space even across chunks.
    pub fn split<'a>(&mut self, text: &'a str) -> Vec<TextPiece<'a>> {
        let mut pieces = Vec::new();
        let mut word_start = 0;

        for (index, ch) in text.char_indices() {
            if !ch.is_ascii_whitespace() {
                self.prev_space = false;
                continue;
            }

            pieces.push(TextPiece::WordEnd(&text[word_start..index]));
            word_start = index + ch.len_utf8();

            if self.preformatted {
                match ch {
                    '\n' => pieces.push(TextPiece::Break),
                    '\r' => {}
                    _ => {
                        pieces.push(TextPiece::Space);
                        self.prev_space = true;
                    }
                }
            } else if !self.prev_space {
                pieces.push(TextPiece::Space);
                self.prev_space = true;
            }
        }

        if word_start < text.len() {
            pieces.push(TextPiece::Partial(&text[word_start..]));
        }
        pieces
    }
}
