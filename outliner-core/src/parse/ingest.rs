use itertools::Itertools;

use crate::{
    config::OutlineConfig,
    entities::{BBox, PageInfo},
    layout::{LayoutDocument, LayoutLine, LayoutPage},
};

/// A non-empty layout line in reading order, before any feature is computed.
#[derive(Debug, Clone)]
pub struct RawLine<'a> {
    /// 0-based page index.
    pub page_idx: usize,
    pub text: String,
    pub bbox: BBox,
    pub layout: &'a LayoutLine,
}

/// Page geometry, with the fallback size standing in for degenerate pages.
pub fn page_infos(doc: &LayoutDocument, config: &OutlineConfig) -> Vec<PageInfo> {
    doc.pages
        .iter()
        .map(|page| {
            let valid = |v: f32| v.is_finite() && v > 0f32;
            PageInfo {
                width: if valid(page.width) {
                    page.width
                } else {
                    config.default_page_width
                },
                height: if valid(page.height) {
                    page.height
                } else {
                    config.default_page_height
                },
            }
        })
        .collect()
}

/// Page info for a 0-based page index, falling back to the default page size.
pub fn page_info(pages: &[PageInfo], page_idx: usize, config: &OutlineConfig) -> PageInfo {
    pages.get(page_idx).copied().unwrap_or(PageInfo {
        width: config.default_page_width,
        height: config.default_page_height,
    })
}

fn page_reading_order(page_idx: usize, page: &LayoutPage) -> impl Iterator<Item = RawLine<'_>> {
    page.blocks
        .iter()
        .sorted_by(|a, b| {
            a.bbox
                .y0
                .total_cmp(&b.bbox.y0)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        })
        .flat_map(|block| {
            block.lines.iter().sorted_by(|a, b| {
                a.bbox
                    .y0
                    .total_cmp(&b.bbox.y0)
                    .then(a.bbox.x0.total_cmp(&b.bbox.x0))
            })
        })
        .filter_map(move |layout| {
            let text = layout.text();
            (!text.is_empty()).then_some(RawLine {
                page_idx,
                text,
                bbox: layout.bbox,
                layout,
            })
        })
}

/// Every non-empty line of the document: pages in order, blocks then lines top-to-bottom,
/// left-to-right.
pub fn reading_order(doc: &LayoutDocument) -> Vec<RawLine<'_>> {
    doc.pages
        .iter()
        .enumerate()
        .flat_map(|(page_idx, page)| page_reading_order(page_idx, page))
        .collect()
}

/// Mean size over every span with a positive size, empty lines included.
pub fn mean_span_size(doc: &LayoutDocument, default_size: f32) -> f64 {
    let (sum, count) = doc
        .pages
        .iter()
        .flat_map(|p| p.lines())
        .flat_map(|l| l.spans.iter())
        .filter(|s| s.size > 0f32)
        .fold((0f64, 0usize), |(sum, count), s| {
            (sum + s.size as f64, count + 1)
        });
    if count == 0 {
        default_size as f64
    } else {
        sum / count as f64
    }
}
