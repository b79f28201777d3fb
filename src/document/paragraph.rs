//! Immutable paragraph text

use std::fmt;
use std::sync::Arc;

use crate::document::Rope;

/// Shared handle to a paragraph
///
/// The handle's allocation address doubles as the paragraph's identity:
/// every mutation builds a fresh `Paragraph`, so two handles compare
/// pointer-equal exactly when the paragraph is unchanged between snapshots.
pub type ParaRef = Arc<Paragraph>;

/// One logical paragraph of text
///
/// Immutable after construction; `insert_text` and `split` return new
/// paragraphs sharing unchanged rope structure with the original.
pub struct Paragraph {
    text: Rope,
}

impl Paragraph {
    /// Create a paragraph from a string
    pub fn new(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
        }
    }

    fn from_rope(text: Rope) -> Self {
        Self { text }
    }

    /// Get the byte length of the paragraph
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the paragraph is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get the full text as a string
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Return a new paragraph with `text` spliced in at byte offset `at`
    ///
    /// The offset must lie on a code-point boundary within `[0, len]`.
    pub fn insert_text(&self, at: usize, text: &str) -> Paragraph {
        Paragraph::from_rope(self.text.insert(at, text))
    }

    /// Split into two paragraphs whose concatenation equals this one
    ///
    /// Same boundary constraints as [`Paragraph::insert_text`].
    pub fn split(&self, at: usize) -> (Paragraph, Paragraph) {
        let (left, right) = self.text.split(at);
        (Paragraph::from_rope(left), Paragraph::from_rope(right))
    }

    /// Read the code point starting at the given byte offset
    pub fn char_at(&self, at: usize) -> Option<char> {
        self.text.char_at(at)
    }

    /// Check whether the offset falls on a code-point boundary
    pub fn is_char_boundary(&self, at: usize) -> bool {
        self.text.is_char_boundary(at)
    }
}

impl fmt::Debug for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Paragraph({:?})", self.text())
    }
}
