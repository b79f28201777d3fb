//! Half-open span between two points of one snapshot

use crate::document::Document;
use crate::editing::Point;

/// A half-open span `[start, end)` of one document snapshot
///
/// Produced by every mutation on [`Point`]; both endpoints are bound to the
/// snapshot the mutation created.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    start: Point,
    end: Point,
}

impl Range {
    /// Create a range from two points bound to the same snapshot
    ///
    /// Panics when the points come from different snapshots; that is a
    /// caller bug, not a recoverable condition.
    pub fn new(start: Point, end: Point) -> Range {
        assert!(
            start.document().ptr_eq(end.document()),
            "range endpoints bound to different document snapshots"
        );
        Range { start, end }
    }

    pub fn start(&self) -> &Point {
        &self.start
    }

    pub fn end(&self) -> &Point {
        &self.end
    }

    /// The snapshot both endpoints are bound to
    pub fn document(&self) -> &Document {
        self.start.document()
    }

    /// Check whether the point lies in `[start, end)`
    ///
    /// Points from another snapshot are never contained. A range with equal
    /// endpoints contains nothing.
    pub fn contains(&self, point: &Point) -> bool {
        if !point.document().ptr_eq(self.start.document()) {
            return false;
        }
        if point.paragraph_index() < self.start.paragraph_index()
            || point.paragraph_index() > self.end.paragraph_index()
        {
            return false;
        }
        if point.paragraph_index() == self.start.paragraph_index()
            && point.text_offset() < self.start.text_offset()
        {
            return false;
        }
        if point.paragraph_index() == self.end.paragraph_index()
            && point.text_offset() >= self.end.text_offset()
        {
            return false;
        }
        true
    }
}
