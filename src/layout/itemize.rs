//! Paragraph itemisation
//!
//! Phase one of the renderer: walk the paragraph text and emit the
//! box/glue/penalty stream the line breaker consumes. Segmentation follows
//! the Unicode line-breaking and word-boundary rules; every run of leading
//! spaces in a word becomes glue, the remainder a box.

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

use crate::layout::item::{ItemKind, ParagraphItem, Style, PENALTY_ALWAYS};

/// Visible stand-in for the paragraph break
pub const PARAGRAPH_MARK: &str = "¶";

/// Itemise one paragraph's text
///
/// The stream always ends with a markup paragraph mark followed by a forced
/// break: the sentinel the line breaker relies on to flush the final line.
pub fn itemize_paragraph(text: &str) -> Vec<ParagraphItem> {
    let mut items = Vec::new();

    let mut segment_start = 0;
    for (position, opportunity) in linebreaks(text) {
        let segment = &text[segment_start..position];
        append_segment_items(&mut items, segment, segment_start);

        // A segment closed by a hard break character forces a line break;
        // the synthetic opportunity at the end of text does not.
        if opportunity == BreakOpportunity::Mandatory && ends_with_hard_break(segment) {
            items.push(ParagraphItem::new_penalty(position, PENALTY_ALWAYS));
        }

        segment_start = position;
    }
    if segment_start < text.len() {
        append_segment_items(&mut items, &text[segment_start..], segment_start);
    }

    items.push(ParagraphItem::new_marker(
        PARAGRAPH_MARK,
        Style::Markup,
        text.len(),
    ));
    items.push(ParagraphItem::new_penalty(text.len(), PENALTY_ALWAYS));

    assert!(
        items
            .last()
            .is_some_and(|item| item.kind() == ItemKind::Penalty && item.penalty() < 0),
        "paragraph items do not end in a forced break"
    );

    items
}

/// Itemise one line segment: leading spaces of each word become glue, the
/// remainder a box
fn append_segment_items(items: &mut Vec<ParagraphItem>, segment: &str, start_offset: usize) {
    let mut offset = start_offset;

    for word in segment.split_word_bounds() {
        let mut word = word;

        // Multiple spaces become multiple glues
        while let Some(rest) = word.strip_prefix(' ') {
            items.push(ParagraphItem::new_glue(offset));
            offset += 1;
            word = rest;
        }

        if !word.is_empty() {
            items.push(ParagraphItem::new_box(word, Style::Normal, offset));
            offset += word.len();
        }
    }
}

/// Check whether the segment text ends in a character that mandates a break
fn ends_with_hard_break(segment: &str) -> bool {
    matches!(
        segment.chars().next_back(),
        Some('\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}')
    )
}
