//! Logical cursor bound to one document snapshot
//!
//! All mutation and navigation lives here: a [`Point`] addresses a byte
//! offset inside one paragraph of one snapshot, and every mutation returns a
//! [`Range`] whose endpoints are bound to the *new* snapshot. That is what
//! lets the front-end chain edits fluently:
//! `point.insert_text("a").end().insert_text("b")`.

use std::fmt;

use crate::document::{Document, ParaRef, Paragraph};
use crate::editing::Range;

/// A logical cursor: `(snapshot, paragraph index, byte offset)`
///
/// The paragraph index may equal the paragraph count, in which case the
/// offset is zero: the document-end sentinel. Offsets always lie on
/// code-point boundaries.
#[derive(Clone)]
pub struct Point {
    doc: Document,
    para_index: usize,
    text_offset: usize,
}

impl Point {
    pub(crate) fn new(doc: Document, para_index: usize, text_offset: usize) -> Self {
        Self {
            doc,
            para_index,
            text_offset,
        }
    }

    /// The snapshot this point is bound to
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The paragraph under the point, or `None` at the document-end sentinel
    pub fn paragraph(&self) -> Option<&ParaRef> {
        if self.para_index >= self.doc.paragraph_count() {
            return None;
        }
        Some(self.doc.get_paragraph(self.para_index))
    }

    /// Index of the paragraph under the point
    pub fn paragraph_index(&self) -> usize {
        self.para_index
    }

    /// Byte offset within the paragraph
    pub fn text_offset(&self) -> usize {
        self.text_offset
    }

    /// Rebind this position to another snapshot
    fn with_document(&self, doc: Document) -> Point {
        Point {
            doc,
            para_index: self.para_index,
            text_offset: self.text_offset,
        }
    }

    pub fn is_document_start(&self) -> bool {
        self.para_index == 0 && self.text_offset == 0
    }

    pub fn is_document_end(&self) -> bool {
        self.para_index >= self.doc.paragraph_count()
    }

    pub fn is_paragraph_start(&self) -> bool {
        self.text_offset == 0
    }

    pub fn is_paragraph_end(&self) -> bool {
        match self.paragraph() {
            Some(para) => self.text_offset >= para.len(),
            None => true,
        }
    }

    /// Advance by exactly one code point
    ///
    /// Crossing into the next paragraph counts as one step; empty paragraphs
    /// are skipped in the same step. The document end is a fixed point, as is
    /// the end of the last paragraph.
    pub fn forward(&self) -> Point {
        if self.is_document_end() {
            return self.clone();
        }

        let mut next = self.clone();
        let para = self.doc.get_paragraph(self.para_index);

        // Is there still more of the paragraph to go?
        if self.text_offset < para.len() {
            let c = para.char_at(self.text_offset).unwrap_or_else(|| {
                panic!(
                    "paragraph byte offset {} does not start a code point",
                    self.text_offset
                )
            });
            next.text_offset += c.len_utf8();
            return next;
        }

        // Do we have another paragraph to move to?
        if self.para_index + 1 >= self.doc.paragraph_count() {
            return next;
        }

        next.para_index += 1;
        next.text_offset = 0;
        let count = next.doc.paragraph_count();
        while next.para_index < count && next.doc.get_paragraph(next.para_index).is_empty() {
            next.para_index += 1;
        }

        next
    }

    /// Advance by `n` code points
    pub fn forward_n(&self, n: usize) -> Point {
        let mut point = self.clone();
        for _ in 0..n {
            point = point.forward();
        }
        point
    }

    /// Insert text at this point, returning the range it occupies in the new
    /// snapshot
    ///
    /// At the document end this appends a new paragraph; anywhere else the
    /// text is spliced into the current paragraph.
    pub fn insert_text(&self, text: &str) -> Range {
        let new_doc = match self.paragraph() {
            None => self.doc.append_paragraph(Paragraph::new(text)),
            Some(para) => {
                let para = para.insert_text(self.text_offset, text);
                self.doc.set_paragraph(self.para_index, para)
            }
        };

        let start = self.with_document(new_doc);
        let mut end = start.clone();
        end.text_offset += text.len();
        Range::new(start, end)
    }

    /// Split the current paragraph at this point, returning the
    /// (zero-length content) range around the break in the new snapshot
    ///
    /// At the document end this appends an empty paragraph and the returned
    /// range is collapsed onto its start.
    pub fn insert_paragraph_break(&self) -> Range {
        let para = match self.paragraph() {
            None => {
                let new_doc = self.doc.append_paragraph(Paragraph::new(""));
                let mut point = self.with_document(new_doc);
                point.text_offset = 0;
                return Range::new(point.clone(), point);
            }
            Some(para) => para,
        };

        let (left, right) = para.split(self.text_offset);
        let new_doc = self
            .doc
            .replace_paragraphs(self.para_index, self.para_index + 1, vec![left, right]);

        let start = self.with_document(new_doc);
        let mut end = start.clone();
        end.para_index += 1;
        end.text_offset = 0;
        Range::new(start, end)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Point) -> bool {
        self.doc.ptr_eq(&other.doc)
            && self.para_index == other.para_index
            && self.text_offset == other.text_offset
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("para_index", &self.para_index)
            .field("text_offset", &self.text_offset)
            .finish()
    }
}
