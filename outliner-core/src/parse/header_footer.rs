use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::{
    config::{OutlineConfig, Patterns},
    entities::{BBox, PageInfo},
    layout::LayoutDocument,
};

use super::ingest::page_info;

/// Identity of a repeated header/footer line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HfKey {
    pub text: String,
    pub y_bucket: i64,
    pub top_zone: bool,
}

impl HfKey {
    /// `None` when too little text survives normalization.
    fn new(text: &str, bbox: &BBox, page: &PageInfo, config: &OutlineConfig) -> Option<Self> {
        let normalized = normalize(text, &config.patterns);
        (normalized.chars().count() > config.hf_min_text_len).then(|| Self {
            text: normalized,
            y_bucket: y_bucket(bbox.y0, config.hf_y_bucket),
            top_zone: in_top_zone(bbox, page, config),
        })
    }
}

/// Why a line was dropped before feature extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redundancy {
    NonContent,
    TooShort,
    Repeated { count: usize },
}

/// Lower-cased, whitespace-collapsed text without trailing page counters, ISO dates or hashes.
pub fn normalize(text: &str, patterns: &Patterns) -> String {
    let normalized = patterns.collapse_whitespace(text).to_lowercase();
    let normalized = patterns.hf_trailing_counter.replace(&normalized, "");
    let normalized = patterns.hf_date.replace_all(normalized.trim(), "");
    let normalized = patterns.hf_hash.replace_all(normalized.trim(), "");
    normalized.trim().to_owned()
}

#[inline(always)]
pub fn y_bucket(y: f32, bucket: f32) -> i64 {
    (y as f64 / bucket as f64).trunc() as i64 * bucket as i64
}

#[inline(always)]
fn in_top_zone(bbox: &BBox, page: &PageInfo, config: &OutlineConfig) -> bool {
    (bbox.y0 as f64) < page.height as f64 * config.hf_top_zone_ratio
}

#[inline(always)]
fn in_bottom_zone(bbox: &BBox, page: &PageInfo, config: &OutlineConfig) -> bool {
    bbox.y1 as f64 > page.height as f64 * (1.0 - config.hf_bottom_zone_ratio)
}

/// How many of the first pages carry each header/footer line.
#[derive(Debug, Clone, Default)]
pub struct HfCensus {
    counts: HashMap<HfKey, usize>,
    total_pages: usize,
}

impl HfCensus {
    #[instrument(skip_all)]
    pub fn build(doc: &LayoutDocument, pages: &[PageInfo], config: &OutlineConfig) -> Self {
        let total_pages = doc.page_count();
        let mut counts: HashMap<HfKey, usize> = HashMap::new();

        for (page_idx, page) in doc
            .pages
            .iter()
            .enumerate()
            .take(total_pages.min(config.hf_scan_pages))
        {
            let info = page_info(pages, page_idx, config);
            for line in page.lines() {
                let text = line.text();
                if text.is_empty() {
                    continue;
                }
                if !in_top_zone(&line.bbox, &info, config)
                    && !in_bottom_zone(&line.bbox, &info, config)
                {
                    continue;
                }
                if let Some(key) = HfKey::new(&text, &line.bbox, &info, config) {
                    *counts.entry(key).or_default() += 1;
                }
            }
        }

        info!(
            "header/footer census found {} unique candidates over {} pages",
            counts.len(),
            total_pages
        );
        Self {
            counts,
            total_pages,
        }
    }

    /// Number of scanned pages carrying `key`, zero when never seen.
    pub fn count(&self, key: &HfKey) -> usize {
        self.counts.get(key).copied().unwrap_or_default()
    }

    /// Classify a line anywhere in the document; `None` keeps it.
    pub fn redundancy(
        &self,
        text: &str,
        bbox: &BBox,
        page: &PageInfo,
        config: &OutlineConfig,
    ) -> Option<Redundancy> {
        let patterns = &config.patterns;
        if patterns.is_non_content(text) {
            return Some(Redundancy::NonContent);
        }

        let trimmed = text.trim();
        if trimmed.chars().count() < config.min_line_len {
            if patterns.short_token.is_match(trimmed) {
                return None;
            }
            return Some(Redundancy::TooShort);
        }

        if self.total_pages == 0 {
            return None;
        }
        let key = HfKey::new(text, bbox, page, config)?;
        let count = self.count(&key);
        (count >= config.hf_min_pages
            && count as f64 / self.total_pages as f64 >= config.hf_repetition_ratio)
            .then_some(Redundancy::Repeated { count })
    }

    pub fn is_redundant(
        &self,
        text: &str,
        bbox: &BBox,
        page: &PageInfo,
        config: &OutlineConfig,
    ) -> bool {
        match self.redundancy(text, bbox, page, config) {
            Some(reason) => {
                debug!("dropped {:?} line: {:?}", reason, text);
                true
            }
            None => false,
        }
    }
}
