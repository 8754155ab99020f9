//! [`LayoutSource`] backed by pdfium: characters are grouped into styled spans, spans into
//! lines and lines into blocks.
use std::path::Path;

use anyhow::Context;
use pdfium_render::prelude::{
    PdfFontWeight, PdfPage, PdfPageTextChar, PdfRect, Pdfium, PdfiumLibraryBindings,
};
use tracing::{debug, instrument, warn};

use super::{
    LayoutBlock, LayoutDocument, LayoutLine, LayoutPage, LayoutSource, LayoutSpan,
    SPAN_FLAG_BOLD, SPAN_FLAG_ITALIC,
};
use crate::entities::BBox;

/// Directory holding the pdfium shared library, checked before `./` and the system paths.
pub const PDFIUM_LIB_DIR_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// pdfium reports rects with a bottom-left origin, the layout uses top-left.
fn bbox_from_pdfrect(
    PdfRect {
        bottom,
        left,
        top,
        right,
    }: PdfRect,
    page_height: f32,
) -> BBox {
    BBox {
        x0: left.value,
        y0: page_height - top.value,
        x1: right.value,
        y1: page_height - bottom.value,
    }
}

#[inline(always)]
fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\x02')
}

/// A single glyph with the style attributes that decide span boundaries.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PageChar {
    pub(crate) ch: char,
    pub(crate) bbox: BBox,
    pub(crate) size: f32,
    pub(crate) font: String,
    pub(crate) flags: u32,
    pub(crate) color: u32,
}

impl PageChar {
    fn from_pdfium(char: &PdfPageTextChar, page_height: f32) -> Option<Self> {
        let ch = char.unicode_char()?;
        let bbox = char
            .tight_bounds()
            .or_else(|_| char.loose_bounds())
            .map(|rect| bbox_from_pdfrect(rect, page_height))
            .unwrap_or_default();

        let weight_is_bold = match char.font_weight() {
            Some(PdfFontWeight::Weight600)
            | Some(PdfFontWeight::Weight700Bold)
            | Some(PdfFontWeight::Weight800)
            | Some(PdfFontWeight::Weight900) => true,
            Some(PdfFontWeight::Custom(weight)) => weight >= 600,
            _ => false,
        };
        let font = char.font_name();
        let mut flags = 0;
        if weight_is_bold || char.font_is_bold_reenforced() || font.contains("Bold") {
            flags |= SPAN_FLAG_BOLD;
        }
        if char.font_is_italic() {
            flags |= SPAN_FLAG_ITALIC;
        }

        let color = char
            .fill_color()
            .map(|c| (c.red() as u32) << 16 | (c.green() as u32) << 8 | c.blue() as u32)
            .unwrap_or(0);

        Some(Self {
            ch,
            bbox,
            size: char.scaled_font_size().value,
            font,
            flags,
            color,
        })
    }

    fn same_style(&self, span: &LayoutSpan) -> bool {
        self.size == span.size
            && self.font == span.font
            && self.flags == span.flags
            && self.color == span.color
    }
}

/// A run of consecutive glyphs sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharSpan {
    pub(crate) bbox: BBox,
    pub(crate) span: LayoutSpan,
    /// A line break followed the last glyph.
    pub(crate) ends_line: bool,
}

impl CharSpan {
    fn new_from_char(char: PageChar) -> Self {
        Self {
            bbox: char.bbox,
            span: LayoutSpan {
                text: char.ch.into(),
                size: char.size,
                font: char.font,
                flags: char.flags,
                color: char.color,
            },
            ends_line: false,
        }
    }

    /// Absorb `char` when it continues this span, otherwise hand it back.
    fn append(&mut self, char: PageChar) -> Result<(), PageChar> {
        // spaces are often synthesized by pdfium with a default font and empty bounds
        if char.ch.is_whitespace() {
            self.span.text.push(char.ch);
            return Ok(());
        }
        if self.ends_line || !char.same_style(&self.span) {
            return Err(char);
        }
        self.span.text.push(char.ch);
        self.bbox.merge(&char.bbox);
        Ok(())
    }
}

pub(crate) fn parse_text_spans(chars: impl IntoIterator<Item = PageChar>) -> Vec<CharSpan> {
    let mut spans: Vec<CharSpan> = Vec::new();

    for char in chars {
        if is_line_break(char.ch) {
            if let Some(span) = spans.last_mut() {
                span.ends_line = true;
            }
            continue;
        }
        let rejected = match spans.last_mut() {
            Some(span) if !span.ends_line || !char.ch.is_whitespace() => span.append(char).err(),
            // nothing to attach leading whitespace to
            _ if char.ch.is_whitespace() => None,
            _ => Some(char),
        };
        if let Some(char) = rejected {
            spans.push(CharSpan::new_from_char(char));
        }
    }

    spans
}

#[derive(Debug)]
struct PendingLine {
    bbox: BBox,
    spans: Vec<LayoutSpan>,
    closed: bool,
}

impl PendingLine {
    fn new_from_span(span: CharSpan) -> Self {
        Self {
            bbox: span.bbox,
            closed: span.ends_line,
            spans: vec![span.span],
        }
    }

    fn append(&mut self, span: CharSpan) -> Result<(), CharSpan> {
        // pdfium doesn't always emit a line break, so the positions are checked as well
        if self.closed || span.bbox.y0 > self.bbox.y1 {
            return Err(span);
        }
        self.bbox.merge(&span.bbox);
        self.closed = span.ends_line;
        self.spans.push(span.span);
        Ok(())
    }

    /// Trimmed, non-empty spans only; `None` when nothing is left.
    fn finish(self) -> Option<LayoutLine> {
        let spans: Vec<LayoutSpan> = self
            .spans
            .into_iter()
            .filter_map(|mut span| {
                let trimmed = span.text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                span.text = trimmed.to_owned();
                Some(span)
            })
            .collect();
        (!spans.is_empty()).then_some(LayoutLine {
            bbox: self.bbox,
            spans,
        })
    }
}

pub(crate) fn parse_text_lines(spans: Vec<CharSpan>) -> Vec<LayoutLine> {
    let mut lines: Vec<PendingLine> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some(line) => {
                if let Err(span) = line.append(span) {
                    lines.push(PendingLine::new_from_span(span));
                }
            }
            None => lines.push(PendingLine::new_from_span(span)),
        }
    }

    lines.into_iter().filter_map(PendingLine::finish).collect()
}

/// Stack consecutive lines into a block while they overlap horizontally and the gap to the
/// previous line stays under that line's height.
pub(crate) fn parse_text_blocks(lines: Vec<LayoutLine>) -> Vec<LayoutBlock> {
    let mut blocks: Vec<LayoutBlock> = Vec::new();
    for line in lines {
        let joins = blocks.last().and_then(|b| b.lines.last()).is_some_and(|prev| {
            prev.bbox.overlap_x(&line.bbox) > 0f32
                && line.bbox.y0 - prev.bbox.y1 < prev.bbox.height()
        });
        match blocks.last_mut() {
            Some(block) if joins => {
                block.bbox.merge(&line.bbox);
                block.lines.push(line);
            }
            _ => blocks.push(LayoutBlock {
                bbox: line.bbox,
                lines: vec![line],
            }),
        }
    }
    blocks
}

fn parse_page(page: &PdfPage) -> anyhow::Result<LayoutPage> {
    let width = page.width().value;
    let height = page.height().value;

    let text = page.text()?;
    let text_chars = text.chars();
    let chars = text_chars
        .iter()
        .filter_map(|char| PageChar::from_pdfium(&char, height));
    let blocks = parse_text_blocks(parse_text_lines(parse_text_spans(chars)));

    Ok(LayoutPage {
        width,
        height,
        blocks,
    })
}

fn bind_pdfium() -> anyhow::Result<Box<dyn PdfiumLibraryBindings>> {
    if let Ok(dir) = std::env::var(PDFIUM_LIB_DIR_ENV) {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)) {
            Ok(bindings) => return Ok(bindings),
            Err(e) => warn!("can't bind pdfium from {}: {}", dir, e),
        }
    }
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .context("can't bind to the pdfium library")
}

/// Reads `.pdf` files through a dynamically bound pdfium library.
pub struct PdfiumLayoutSource {
    pdfium: Pdfium,
}

impl PdfiumLayoutSource {
    pub fn new() -> anyhow::Result<Self> {
        let bindings = bind_pdfium()?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl LayoutSource for PdfiumLayoutSource {
    fn accepts(&self, path: &Path) -> bool {
        is_pdf(path)
    }

    #[instrument(skip(self))]
    fn load(&self, path: &Path) -> anyhow::Result<LayoutDocument> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .with_context(|| format!("can't open {}", path.display()))?;

        let pages = document
            .pages()
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                parse_page(&page).with_context(|| format!("can't read text of page {idx}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        debug!("loaded {} pages from {}", pages.len(), path.display());
        Ok(LayoutDocument { pages })
    }
}

pub(crate) fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
