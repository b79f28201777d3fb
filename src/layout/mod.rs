//! Paragraph layout engine

mod cache;
mod engine;
mod item;
mod itemize;

pub use cache::{ParaKey, CACHE_CHUNK_SIZE};
pub use engine::{Layout, LayoutError, LineIterator};
pub use item::{
    Cell, ItemKind, Line, ParagraphItem, Style, PENALTY_ALWAYS, PENALTY_NEUTRAL, PENALTY_NEVER,
};
pub use itemize::{itemize_paragraph, PARAGRAPH_MARK};
