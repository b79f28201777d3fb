//! Layout engine
//!
//! Owns the current document, the screen width and the per-paragraph line
//! cache. Rendering runs in two phases: itemisation (see
//! [`crate::layout::itemize`]) and greedy first-fit line breaking over the
//! item stream. The item vocabulary would equally feed an optimal-fit
//! breaker; swapping one in is local to this module.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::document::{Document, ParaRef, Paragraph};
use crate::editing::Point;
use crate::layout::cache::{chunked_capacity, LruCache};
use crate::layout::item::{ItemKind, Line, ParagraphItem};
use crate::layout::itemize::itemize_paragraph;

/// Recoverable layout failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The point is bound to a snapshot other than the layout's current one
    #[error("point is bound to a different document")]
    DifferentDocument,
    /// The point's offset is on no rendered line of its paragraph
    #[error("point not found in layout")]
    PointNotFound,
    /// The line cache cannot be built with the requested capacity
    #[error("invalid cache capacity")]
    InvalidCacheCapacity,
}

/// Converts a document and a screen width into wrapped lines
///
/// Mutates its cache on every lookup; confine it to one thread.
pub struct Layout {
    document: Document,
    screen_width: usize,
    para_cache: LruCache,
}

impl Layout {
    /// Create a layout for the given document and screen width
    pub fn new(document: Document, screen_width: usize) -> Result<Layout, LayoutError> {
        let para_cache = LruCache::new(chunked_capacity(document.paragraph_count()))?;
        Ok(Layout {
            document,
            screen_width,
            para_cache,
        })
    }

    pub fn screen_width(&self) -> usize {
        self.screen_width
    }

    /// Change the screen width; every cached line depends on it, so the
    /// cache is purged
    pub fn set_screen_width(&mut self, screen_width: usize) {
        if screen_width == self.screen_width {
            return;
        }
        debug!(screen_width, "screen width changed, purging line cache");
        self.para_cache.purge();
        self.screen_width = screen_width;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Swap in a new document snapshot
    ///
    /// Entries for paragraphs shared with the old snapshot stay valid; the
    /// cache capacity follows the paragraph count.
    pub fn set_document(&mut self, document: Document) {
        if document.ptr_eq(&self.document) {
            return;
        }
        let capacity = chunked_capacity(document.paragraph_count());
        debug!(
            paragraphs = document.paragraph_count(),
            capacity, "document swapped"
        );
        self.para_cache.resize(capacity);
        self.document = document;
    }

    /// Get the wrapped lines of a paragraph, rendering on a cache miss
    pub fn paragraph_lines(&mut self, para: &ParaRef) -> Arc<Vec<Line>> {
        if let Some(lines) = self.para_cache.get(para) {
            return lines;
        }

        trace!(bytes = para.len(), "rendering paragraph");
        let lines = Arc::new(self.render_paragraph(para));
        self.para_cache.insert(para.clone(), lines.clone());
        lines
    }

    fn render_paragraph(&self, para: &Paragraph) -> Vec<Line> {
        let items = itemize_paragraph(&para.text());
        break_lines(items, self.screen_width)
    }

    /// Translate a point into `(column, row)` cell coordinates
    ///
    /// The row is global across the whole document. Fails when the point is
    /// bound to another snapshot, or when its offset lies on no rendered
    /// line; a cursor parked exactly at paragraph end is such an offset.
    pub fn cell_location_for_point(&mut self, point: &Point) -> Result<(usize, usize), LayoutError> {
        if !point.document().ptr_eq(&self.document) {
            return Err(LayoutError::DifferentDocument);
        }
        if self.document.paragraph_count() == 0 {
            return Ok((0, 0));
        }

        let mut row_offset = 0;
        for index in 0..self.document.paragraph_count() {
            let para = self.document.get_paragraph(index).clone();
            let lines = self.paragraph_lines(&para);

            if index != point.paragraph_index() {
                row_offset += lines.len();
                continue;
            }

            let target = point.text_offset();
            for (line_index, line) in lines.iter().enumerate() {
                if line.is_empty() || line.start_offset() > target || line.end_offset() <= target {
                    continue;
                }

                let mut column = 0;
                for item in line.items() {
                    if item.contains_offset(target) {
                        return Ok((column + (target - item.start_offset()), row_offset + line_index));
                    }
                    column += item.cell_count();
                }
            }

            return Err(LayoutError::PointNotFound);
        }

        Err(LayoutError::PointNotFound)
    }

    /// Iterate lazily over `(global line index, line)` pairs, starting at
    /// the given global line index
    pub fn line_iterator(&mut self, start_line: usize) -> LineIterator<'_> {
        LineIterator {
            layout: self,
            para_index: 0,
            lines: None,
            line_in_para: 0,
            global_index: 0,
            start_line,
        }
    }

    /// Render the whole document as plain text, one wrapped line per row
    ///
    /// Placeholder cells are skipped; markup cells (the paragraph mark) are
    /// included. Debug and test helper.
    pub fn render_to_string(&mut self) -> String {
        let mut out = String::new();
        for (_, line) in self.line_iterator(0) {
            for cell in line.cells() {
                if !cell.is_placeholder() {
                    out.push(cell.mainc);
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Break an item stream into lines no wider than `screen_width`
///
/// Greedy first-fit: remember the most recent feasible break, flush when an
/// item overflows the width or a forced break arrives. The itemiser's
/// trailing sentinel guarantees the final line is flushed. A box wider than
/// the screen cannot break, so the line is cut at the offending item
/// instead; such lines are the only ones that may overflow.
fn break_lines(items: Vec<ParagraphItem>, screen_width: usize) -> Vec<Line> {
    // running_widths[i] is the total cell width of items[..i]
    let mut running_widths = Vec::with_capacity(items.len() + 1);
    running_widths.push(0);
    for item in &items {
        running_widths.push(running_widths[running_widths.len() - 1] + item.cell_count());
    }

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_break: Option<usize> = None;

    let mut index = 0;
    while index < items.len() {
        let item = &items[index];

        // We can never break on boxes
        if item.kind() == ItemKind::Box {
            index += 1;
            continue;
        }

        let width = running_widths[index] - running_widths[line_start];

        if width <= screen_width {
            line_break = Some(index);
        }

        if width > screen_width || item.penalty() < 0 {
            let break_index = match line_break {
                Some(at) if at >= line_start => at,
                _ => index,
            };
            lines.push(Line::new(items[line_start..break_index].to_vec()));
            line_start = break_index + 1;
            line_break = None;

            // An overflow cut before this item; it still needs examining
            // against the line it now starts, or a trailing forced break
            // would lose the final line.
            if break_index < index {
                continue;
            }
        }

        index += 1;
    }

    lines
}

/// Lazy cursor over the document's wrapped lines
///
/// Walks paragraphs in order, populating the line cache as it goes; lines
/// before the starting index are consumed without being yielded.
pub struct LineIterator<'a> {
    layout: &'a mut Layout,
    para_index: usize,
    lines: Option<Arc<Vec<Line>>>,
    line_in_para: usize,
    global_index: usize,
    start_line: usize,
}

impl Iterator for LineIterator<'_> {
    type Item = (usize, Line);

    fn next(&mut self) -> Option<(usize, Line)> {
        loop {
            let lines = match self.lines.take() {
                Some(lines) => lines,
                None => {
                    if self.para_index >= self.layout.document.paragraph_count() {
                        return None;
                    }
                    let para = self.layout.document.get_paragraph(self.para_index).clone();
                    self.line_in_para = 0;
                    self.layout.paragraph_lines(&para)
                }
            };

            if self.line_in_para >= lines.len() {
                self.para_index += 1;
                continue;
            }

            let line = lines[self.line_in_para].clone();
            self.line_in_para += 1;
            self.lines = Some(lines);

            let index = self.global_index;
            self.global_index += 1;
            if index < self.start_line {
                continue;
            }
            return Some((index, line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::item::Style;

    fn layout_for(text: &str, width: usize) -> (Document, Layout) {
        let doc = Document::from_text(text);
        let layout = Layout::new(doc.clone(), width).unwrap();
        (doc, layout)
    }

    fn line_text(line: &Line) -> String {
        line.cells()
            .filter(|cell| !cell.is_placeholder())
            .map(|cell| cell.mainc)
            .collect()
    }

    #[test]
    fn test_wraps_at_glue() {
        let (doc, mut layout) = layout_for("aaa bbb ccc ddd", 10);
        let lines = layout.paragraph_lines(&doc.get_paragraph(0).clone());

        assert_eq!(lines.len(), 2);
        for line in lines.iter() {
            assert!(line.cell_count() <= 10);
        }
        assert_eq!(line_text(&lines[0]), "aaa bbb");
        assert_eq!(line_text(&lines[1]), "ccc ddd¶");
    }

    #[test]
    fn test_fits_on_one_line_at_large_width() {
        let (doc, mut layout) = layout_for("aaa bbb ccc ddd", 100);
        let lines = layout.paragraph_lines(&doc.get_paragraph(0).clone());
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "aaa bbb ccc ddd¶");
    }

    #[test]
    fn test_never_breaks_mid_word() {
        let (doc, mut layout) = layout_for("alpha beta gamma delta epsilon", 12);
        let lines = layout.paragraph_lines(&doc.get_paragraph(0).clone());
        for line in lines.iter() {
            for item in line.items() {
                if item.kind() == ItemKind::Box && item.style() == Style::Normal {
                    assert!("alpha beta gamma delta epsilon".contains(item.text()));
                }
            }
        }
    }

    #[test]
    fn test_oversize_box_takes_emergency_break() {
        let (doc, mut layout) = layout_for("abcdefghij xy", 4);
        let lines = layout.paragraph_lines(&doc.get_paragraph(0).clone());
        // the ten-cell word cannot fit a four-cell screen; it gets a line of
        // its own and layout carries on
        assert!(lines.iter().any(|line| line_text(line).contains("abcdefghij")));
        assert!(lines.iter().any(|line| line_text(line).contains("xy")));
    }

    #[test]
    fn test_empty_paragraph_renders_mark_only() {
        let mut layout = Layout::new(Document::new(), 10).unwrap();
        let para = Arc::new(Paragraph::new(""));
        let lines = layout.paragraph_lines(&para);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "¶");
    }

    #[test]
    fn test_wide_clusters_count_two_cells() {
        let (doc, mut layout) = layout_for("日本 語", 4);
        let lines = layout.paragraph_lines(&doc.get_paragraph(0).clone());
        // "日本" is four cells wide; the glue would overflow
        assert_eq!(lines[0].cell_count(), 4);
        let placeholders = lines[0]
            .cells()
            .filter(|cell| cell.is_placeholder())
            .count();
        assert_eq!(placeholders, 2);
    }

    #[test]
    fn test_cell_location_start_point() {
        let (doc, mut layout) = layout_for("hello world", 80);
        assert_eq!(layout.cell_location_for_point(&doc.start_point()), Ok((0, 0)));
    }

    #[test]
    fn test_cell_location_empty_document() {
        let doc = Document::new();
        let mut layout = Layout::new(doc.clone(), 80).unwrap();
        assert_eq!(layout.cell_location_for_point(&doc.start_point()), Ok((0, 0)));
    }

    #[test]
    fn test_cell_location_within_line() {
        let (doc, mut layout) = layout_for("aaa bbb", 80);
        let point = doc.start_point().forward_n(4);
        assert_eq!(layout.cell_location_for_point(&point), Ok((4, 0)));
    }

    #[test]
    fn test_cell_location_on_wrapped_line() {
        let (doc, mut layout) = layout_for("aaa bbb ccc ddd", 10);
        // offset 8 starts "ccc", the first box of the second line
        let point = doc.start_point().forward_n(8);
        assert_eq!(layout.cell_location_for_point(&point), Ok((0, 1)));
    }

    #[test]
    fn test_cell_location_across_paragraphs() {
        let (doc, mut layout) = layout_for("aaa bbb ccc ddd\nxyz", 10);
        // first paragraph wraps to two rows, so "xyz" sits on row 2
        let point = doc.start_point().forward_n(16);
        assert_eq!(layout.cell_location_for_point(&point), Ok((0, 2)));
    }

    #[test]
    fn test_cell_location_at_paragraph_end_not_found() {
        let (doc, mut layout) = layout_for("abc\ndef", 80);
        let point = doc.start_point().forward_n(3);
        assert_eq!(
            layout.cell_location_for_point(&point),
            Err(LayoutError::PointNotFound)
        );
    }

    #[test]
    fn test_cell_location_different_document() {
        let (_, mut layout) = layout_for("abc", 80);
        let other = Document::from_text("abc");
        assert_eq!(
            layout.cell_location_for_point(&other.start_point()),
            Err(LayoutError::DifferentDocument)
        );
    }

    #[test]
    fn test_unrelated_edit_keeps_cache_identity() {
        let doc = Document::from_text("first one\nsecond one\nthird one");
        let mut layout = Layout::new(doc.clone(), 80).unwrap();
        let before_first = layout.paragraph_lines(&doc.get_paragraph(0).clone());
        let before_second = layout.paragraph_lines(&doc.get_paragraph(1).clone());

        // edit the second paragraph only
        let range = doc.start_point().forward_n(10).insert_text("x");
        let new_doc = range.document().clone();
        layout.set_document(new_doc.clone());

        let after_first = layout.paragraph_lines(&new_doc.get_paragraph(0).clone());
        let after_second = layout.paragraph_lines(&new_doc.get_paragraph(1).clone());

        assert!(Arc::ptr_eq(&before_first, &after_first));
        assert!(!Arc::ptr_eq(&before_second, &after_second));
        assert_eq!(line_text(&after_second[0]), "xsecond one¶");
    }

    #[test]
    fn test_width_change_purges_and_reproduces() {
        let doc = Document::from_text("aaa bbb ccc ddd");
        let mut layout = Layout::new(doc.clone(), 10).unwrap();
        let para = doc.get_paragraph(0).clone();
        let original = layout.paragraph_lines(&para);

        layout.set_screen_width(100);
        let wide = layout.paragraph_lines(&para);
        assert_eq!(wide.len(), 1);

        layout.set_screen_width(10);
        let restored = layout.paragraph_lines(&para);
        assert!(!Arc::ptr_eq(&original, &restored));
        assert_eq!(*original, *restored);
    }

    #[test]
    fn test_same_width_keeps_cache() {
        let doc = Document::from_text("stable text");
        let mut layout = Layout::new(doc.clone(), 40).unwrap();
        let para = doc.get_paragraph(0).clone();
        let first = layout.paragraph_lines(&para);
        layout.set_screen_width(40);
        let second = layout.paragraph_lines(&para);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_line_iterator_walks_all_paragraphs() {
        let (_, mut layout) = layout_for("aaa bbb ccc ddd\nxyz\n", 10);
        let rows: Vec<_> = layout.line_iterator(0).collect();
        // two wrapped rows, then "xyz", then the trailing empty paragraph
        assert_eq!(rows.len(), 4);
        let indices: Vec<_> = rows.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(line_text(&rows[2].1), "xyz¶");
        assert_eq!(line_text(&rows[3].1), "¶");
    }

    #[test]
    fn test_line_iterator_seeks_into_paragraph() {
        let (_, mut layout) = layout_for("aaa bbb ccc ddd\nxyz", 10);
        let rows: Vec<_> = layout.line_iterator(1).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 1);
        assert_eq!(line_text(&rows[0].1), "ccc ddd¶");
        assert_eq!(rows[1].0, 2);
    }

    #[test]
    fn test_line_iterator_past_end_is_empty() {
        let (_, mut layout) = layout_for("abc", 10);
        assert_eq!(layout.line_iterator(5).count(), 0);
    }

    #[test]
    fn test_render_to_string() {
        let (_, mut layout) = layout_for("aaa bbb ccc ddd\nxyz", 10);
        assert_eq!(layout.render_to_string(), "aaa bbb\nccc ddd¶\nxyz¶\n");
    }
}
