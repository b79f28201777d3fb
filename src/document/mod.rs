//! Persistent document model
//!
//! A [`Document`] is an immutable snapshot: an ordered sequence of
//! paragraphs plus configuration. Mutation methods return a new snapshot
//! sharing every untouched paragraph, which is what makes identity-keyed
//! layout caching and cursor tracking across edits well-defined.

mod list;
mod paragraph;
mod rope;

pub use list::{ParaIter, ParaList};
pub use paragraph::{ParaRef, Paragraph};
pub use rope::Rope;

use std::fmt;
use std::sync::Arc;

use crate::editing::Point;

/// Document-level configuration carried with each snapshot
///
/// Never consulted by the paragraph contents; mutations copy it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentConfig {
    /// Nominal page width in cells, if the front-end declares one
    pub page_width: Option<usize>,
}

/// An immutable editor snapshot
///
/// Cheap to clone; two clones of the same snapshot compare identical with
/// [`Document::ptr_eq`]. A document with zero paragraphs is legal.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocInner>,
}

struct DocInner {
    paras: ParaList,
    config: DocumentConfig,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create a new empty document with the given configuration
    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            inner: Arc::new(DocInner {
                paras: ParaList::new(),
                config,
            }),
        }
    }

    /// Create a document from text, one paragraph per line
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::new();
        }
        let paras = text
            .split('\n')
            .map(|line| Arc::new(Paragraph::new(line)))
            .collect();
        Self {
            inner: Arc::new(DocInner {
                paras: ParaList::from_paragraphs(paras),
                config: DocumentConfig::default(),
            }),
        }
    }

    fn with_paras(&self, paras: ParaList) -> Document {
        Document {
            inner: Arc::new(DocInner {
                paras,
                config: self.inner.config,
            }),
        }
    }

    /// Check whether two handles refer to the same snapshot
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the document configuration
    pub fn config(&self) -> &DocumentConfig {
        &self.inner.config
    }

    /// Get the number of paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.inner.paras.len()
    }

    /// Get the paragraph at the given index
    pub fn get_paragraph(&self, index: usize) -> &ParaRef {
        self.inner.paras.get(index)
    }

    /// Iterate over all paragraphs
    pub fn paragraphs(&self) -> ParaIter<'_> {
        self.inner.paras.iter()
    }

    /// Iterate over paragraphs in `[start, end)`
    pub fn paragraph_slice(&self, start: usize, end: usize) -> ParaIter<'_> {
        self.inner.paras.iter_range(start, end)
    }

    /// Replace the paragraph at the given index, returning the new snapshot
    pub fn set_paragraph(&self, index: usize, para: Paragraph) -> Document {
        self.with_paras(self.inner.paras.set(index, Arc::new(para)))
    }

    /// Append a paragraph at the tail, returning the new snapshot
    pub fn append_paragraph(&self, para: Paragraph) -> Document {
        self.with_paras(self.inner.paras.push_back(Arc::new(para)))
    }

    /// Remove paragraphs `[start, end)` and insert the given sequence at
    /// `start`, returning the new snapshot
    pub fn replace_paragraphs(&self, start: usize, end: usize, paras: Vec<Paragraph>) -> Document {
        let paras = paras.into_iter().map(Arc::new).collect();
        self.with_paras(self.inner.paras.splice(start, end, paras))
    }

    /// The point before the first paragraph's first byte
    pub fn start_point(&self) -> Point {
        Point::new(self.clone(), 0, 0)
    }

    /// The point past the last paragraph (the document-end sentinel)
    pub fn end_point(&self) -> Point {
        Point::new(self.clone(), self.paragraph_count(), 0)
    }

    /// Full document text, paragraphs joined with newlines
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (index, para) in self.paragraphs().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&para.text());
        }
        out
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("paragraphs", &self.paragraph_count())
            .field("config", &self.inner.config)
            .finish()
    }
}
