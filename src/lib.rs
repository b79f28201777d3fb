//! Termword: the document and layout core of a terminal word processor
//!
//! This crate provides:
//! - A persistent document model: every mutation yields a new snapshot that
//!   shares unchanged paragraphs, so history, caching and cursor tracking
//!   stay well-defined
//! - A cursor algebra: points carry the edit operations and return ranges
//!   bound to the snapshot they created
//! - A paragraph layout engine: box/glue/penalty itemisation, first-fit
//!   wrapping to a cell grid, and an identity-keyed per-paragraph line cache
//!   so typing in one paragraph never re-renders its neighbours
//!
//! The terminal front-end (screen I/O, key handling, cursor painting) is a
//! consumer of these interfaces and lives elsewhere.

pub mod document;
pub mod editing;
pub mod layout;

// Re-export primary types
pub use document::{Document, DocumentConfig, ParaRef, Paragraph, Rope};
pub use editing::{Point, Range};
pub use layout::{Cell, ItemKind, Layout, LayoutError, Line, LineIterator, ParagraphItem, Style};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystrokes_reach_the_screen() {
        let doc = Document::new();
        let mut layout = Layout::new(doc.clone(), 20).unwrap();

        let range = doc
            .start_point()
            .insert_text("This is an example paragraph.")
            .end()
            .insert_paragraph_break();
        let range = range.end().insert_text("And another one.");
        let doc = range.document().clone();
        layout.set_document(doc.clone());

        assert_eq!(doc.text(), "This is an example paragraph.\nAnd another one.");

        // the second paragraph starts below the wrapped first one
        let (column, row) = layout.cell_location_for_point(range.start()).unwrap();
        assert_eq!(column, 0);
        assert!(row >= 2);

        let width = layout.screen_width();
        for (_, line) in layout.line_iterator(0) {
            assert!(line.cell_count() <= width);
        }
    }

    #[test]
    fn test_document_round_trips_through_edits() {
        let doc = Document::new();
        let doc = doc
            .end_point()
            .insert_text("Hello")
            .end()
            .insert_text(", world!")
            .document()
            .clone();
        assert_eq!(doc.text(), "Hello, world!");
        assert_eq!(doc.paragraph_count(), 1);
    }
}
