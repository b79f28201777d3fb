//! Layout items and terminal cells
//!
//! Paragraph text is itemised into boxes, glue and penalties before line
//! breaking. Boxes are unbreakable runs of grapheme clusters, glue is the
//! breakable space between words, and penalties are zero-width scored break
//! opportunities.

use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Breaking here is forbidden
pub const PENALTY_NEVER: i32 = 1000;
/// Breaking here is allowed
pub const PENALTY_NEUTRAL: i32 = 0;
/// Breaking here is forced
pub const PENALTY_ALWAYS: i32 = -1000;

/// Semantic style tag carried by items and cells
///
/// Concrete colours are a front-end concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Ordinary paragraph text
    #[default]
    Normal,
    /// Inter-word space, typically rendered as a dimmed mid-dot
    Glue,
    /// Markup such as the paragraph mark
    Markup,
}

/// One terminal grid position
///
/// `mainc == '\0'` marks the placeholder right half of a double-wide
/// grapheme cluster; front-ends must skip such cells, but they keep column
/// arithmetic honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Main code point
    pub mainc: char,
    /// Combining code points completing the grapheme cluster
    pub combc: SmallVec<[char; 2]>,
    pub style: Style,
    /// First byte of the paragraph span that produced this cell
    pub start_offset: usize,
    /// First byte past that span
    pub end_offset: usize,
}

impl Cell {
    /// Check for the right half of a double-wide cluster
    pub fn is_placeholder(&self) -> bool {
        self.mainc == '\0'
    }
}

/// The kind of a layout item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Unbreakable run of grapheme clusters
    Box,
    /// One breakable inter-word space cell
    Glue,
    /// Zero-width scored break opportunity
    Penalty,
}

/// A layout item within a paragraph
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphItem {
    kind: ItemKind,
    /// On-screen content; only boxes carry text
    text: String,
    style: Style,
    /// Lowest paragraph byte offset represented by this item
    start_offset: usize,
    /// Lowest offset >= `start_offset` not represented by this item
    end_offset: usize,
    /// Break score; only meaningful for glue and penalties
    penalty: i32,
    /// Terminal width of the item in cells
    width: usize,
    cells: Vec<Cell>,
}

impl ParagraphItem {
    /// Create a box from a run of text starting at the given offset
    pub fn new_box(text: &str, style: Style, start_offset: usize) -> Self {
        let (cells, width) = box_cells(text, style, start_offset);
        Self {
            kind: ItemKind::Box,
            text: text.to_string(),
            style,
            start_offset,
            end_offset: start_offset + text.len(),
            penalty: PENALTY_NEVER,
            width,
            cells,
        }
    }

    /// Create a zero-span marker box, such as the paragraph mark
    pub fn new_marker(text: &str, style: Style, at: usize) -> Self {
        let (mut cells, width) = box_cells(text, style, at);
        for cell in &mut cells {
            cell.start_offset = at;
            cell.end_offset = at;
        }
        Self {
            kind: ItemKind::Box,
            text: text.to_string(),
            style,
            start_offset: at,
            end_offset: at,
            penalty: PENALTY_NEVER,
            width,
            cells,
        }
    }

    /// Create a glue item for the space character at the given offset
    pub fn new_glue(start_offset: usize) -> Self {
        let cell = Cell {
            mainc: ' ',
            combc: SmallVec::new(),
            style: Style::Glue,
            start_offset,
            end_offset: start_offset + 1,
        };
        Self {
            kind: ItemKind::Glue,
            text: String::new(),
            style: Style::Glue,
            start_offset,
            end_offset: start_offset + 1,
            penalty: PENALTY_NEUTRAL,
            width: 1,
            cells: vec![cell],
        }
    }

    /// Create a penalty item at the given offset
    pub fn new_penalty(at: usize, penalty: i32) -> Self {
        Self {
            kind: ItemKind::Penalty,
            text: String::new(),
            style: Style::Markup,
            start_offset: at,
            end_offset: at,
            penalty,
            width: 0,
            cells: Vec::new(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// On-screen text; empty for glue and penalties
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Break score; negative forces a break, positive forbids one
    pub fn penalty(&self) -> i32 {
        self.penalty
    }

    /// Minimum number of on-screen cells needed for this item
    pub fn cell_count(&self) -> usize {
        match self.kind {
            ItemKind::Box => self.width,
            ItemKind::Glue => 1,
            ItemKind::Penalty => 0,
        }
    }

    /// The cells this item renders to
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check whether this item's span contains the given paragraph offset
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }
}

/// Render a run of text to cells, cluster by cluster
fn box_cells(text: &str, style: Style, start_offset: usize) -> (Vec<Cell>, usize) {
    let mut cells = Vec::new();
    let mut width = 0;

    for (index, cluster) in text.grapheme_indices(true) {
        let mut chars = cluster.chars();
        let mainc = match chars.next() {
            Some(c) => c,
            None => continue,
        };
        let combc: SmallVec<[char; 2]> = chars.collect();
        let cluster_width = cluster.width();
        let start = start_offset + index;
        let end = start + cluster.len();

        cells.push(Cell {
            mainc,
            combc,
            style,
            start_offset: start,
            end_offset: end,
        });

        // Double-wide clusters occupy a second column.
        if cluster_width == 2 {
            cells.push(Cell {
                mainc: '\0',
                combc: SmallVec::new(),
                style,
                start_offset: start,
                end_offset: end,
            });
        }

        width += cluster_width;
    }

    (cells, width)
}

/// One wrapped screen row of one paragraph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    items: Vec<ParagraphItem>,
}

impl Line {
    pub fn new(items: Vec<ParagraphItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ParagraphItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First paragraph byte offset on this line; zero for an empty line
    pub fn start_offset(&self) -> usize {
        self.items.first().map_or(0, |item| item.start_offset())
    }

    /// First paragraph byte offset past this line; zero for an empty line
    pub fn end_offset(&self) -> usize {
        self.items.last().map_or(0, |item| item.end_offset())
    }

    /// Total width of the line in cells
    pub fn cell_count(&self) -> usize {
        self.items.iter().map(|item| item.cell_count()).sum()
    }

    /// Iterate over the cells of every item in order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.items.iter().flat_map(|item| item.cells().iter())
    }
}
