use crate::{
    entities::{cap_ratio, BBox, Line},
    layout::{
        LayoutBlock, LayoutDocument, LayoutLine, LayoutPage, LayoutSpan, SPAN_FLAG_BOLD,
    },
};

pub(crate) const PAGE_WIDTH: f32 = 595.0;
pub(crate) const PAGE_HEIGHT: f32 = 842.0;

/// Rough advance width of one character, relative to the font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;

fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO
}

/// A plain, unscored line at the left margin.
pub(crate) fn line(text: &str, page: usize, y: f32, font_size: f32) -> Line {
    let trimmed = text.trim();
    Line {
        text: text.to_owned(),
        page,
        bbox: BBox::new(72.0, y, 72.0 + text_width(text, font_size), y + font_size),
        x_pos: 72.0,
        font_size,
        font_name: "Helvetica".to_owned(),
        is_bold: false,
        is_italic: false,
        color: 0,
        rel_font_size: 1.0,
        whitespace_above: 0.0,
        seq_idx: 0,
        word_count: text.split_whitespace().count(),
        cap_ratio: cap_ratio(text),
        ends_with_period: trimmed.ends_with('.'),
        ends_with_colon: trimmed.ends_with(':'),
        has_enumeration: false,
        has_cue_word: false,
        heading_score: 0.0,
    }
}

/// A bold line with a fixed score, ready for selection or merging.
pub(crate) fn heading(text: &str, page: usize, y: f32, font_size: f32, score: f32) -> Line {
    Line {
        is_bold: true,
        heading_score: score,
        ..line(text, page, y, font_size)
    }
}

pub(crate) fn span(text: &str, size: f32, bold: bool) -> LayoutSpan {
    LayoutSpan {
        text: text.to_owned(),
        size,
        font: if bold { "Helvetica-Bold" } else { "Helvetica" }.to_owned(),
        flags: if bold { SPAN_FLAG_BOLD } else { 0 },
        color: 0,
    }
}

pub(crate) fn layout_line(text: &str, x: f32, y: f32, size: f32, bold: bool) -> LayoutLine {
    LayoutLine {
        bbox: BBox::new(x, y, x + text_width(text, size), y + size),
        spans: vec![span(text, size, bold)],
    }
}

/// A line horizontally centred on an A4 page.
pub(crate) fn centered_line(text: &str, y: f32, size: f32, bold: bool) -> LayoutLine {
    let width = text_width(text, size);
    layout_line(text, (PAGE_WIDTH - width) / 2.0, y, size, bold)
}

/// An A4 page with one block per line.
pub(crate) fn page(lines: Vec<LayoutLine>) -> LayoutPage {
    LayoutPage {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        blocks: lines
            .into_iter()
            .map(|line| LayoutBlock {
                bbox: line.bbox,
                lines: vec![line],
            })
            .collect(),
    }
}

pub(crate) fn document(pages: Vec<LayoutPage>) -> LayoutDocument {
    LayoutDocument { pages }
}

/// `count` lines of 11pt body text starting at `y`, 14pt apart.
pub(crate) fn body_lines(count: usize, y: f32) -> Vec<LayoutLine> {
    (0..count)
        .map(|i| {
            layout_line(
                "the committee reviewed the budget and approved it.",
                72.0,
                y + i as f32 * 14.0,
                11.0,
                false,
            )
        })
        .collect()
}
