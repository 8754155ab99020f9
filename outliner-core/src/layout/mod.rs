//! Page layout as produced by a layout extractor: pages of blocks of lines of styled spans.
//!
//! The pipeline only ever reads these types; [`LayoutSource`] is the seam where a concrete
//! document decoder plugs in.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entities::BBox;

pub mod pdfium;

pub const SPAN_FLAG_BOLD: u32 = 1;
pub const SPAN_FLAG_ITALIC: u32 = 1 << 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpan {
    pub text: String,
    pub size: f32,
    pub font: String,
    /// Bit 0: bold, bit 1: italic.
    pub flags: u32,
    /// Packed `0xRRGGBB`.
    pub color: u32,
}

impl LayoutSpan {
    #[inline(always)]
    pub fn is_bold(&self) -> bool {
        self.flags & SPAN_FLAG_BOLD != 0
    }

    #[inline(always)]
    pub fn is_italic(&self) -> bool {
        self.flags & SPAN_FLAG_ITALIC != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub bbox: BBox,
    pub spans: Vec<LayoutSpan>,
}

impl LayoutLine {
    /// Span texts joined by a single space, trimmed.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_owned()
    }

    /// The first span carries the line's style.
    pub fn lead_span(&self) -> Option<&LayoutSpan> {
        self.spans.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub bbox: BBox,
    pub lines: Vec<LayoutLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<LayoutBlock>,
}

impl LayoutPage {
    pub fn lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Something that turns a file on disk into a [`LayoutDocument`].
pub trait LayoutSource {
    /// Whether this source can handle `path` at all.
    fn accepts(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> anyhow::Result<LayoutDocument>;
}
