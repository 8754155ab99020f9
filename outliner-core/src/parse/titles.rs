use itertools::Itertools;
use tracing::{debug, instrument};

use crate::{
    config::OutlineConfig,
    entities::{Line, PageInfo},
};

use super::ingest::page_info;

/// Minimum title length after whitespace collapsing.
const MIN_TITLE_LEN: usize = 5;

/// First line in reading order scoring well above the detection threshold.
fn high_score_fallback(lines: &[Line], config: &OutlineConfig) -> Option<String> {
    let threshold = config.heading_score_threshold + 10f32;
    let fallback = lines
        .iter()
        .filter(|l| l.heading_score > threshold)
        .sorted_by(|a, b| a.spatial_cmp(b))
        .next()
        .map(|l| l.text.trim().to_owned());
    debug!("title fallback: {:?}", fallback);
    fallback
}

fn is_acceptable(title: &str, config: &OutlineConfig) -> bool {
    let patterns = &config.patterns;
    title.chars().count() >= MIN_TITLE_LEN
        && !patterns.bare_number.is_match(title)
        && !patterns.is_non_content(title)
}

/// Largest top-of-first-page text, extended over the centred lines right below it.
///
/// Falls back to the first strongly scored line, then to the placeholder title.
#[instrument(skip_all)]
pub fn extract_title(lines: &[Line], pages: &[PageInfo], config: &OutlineConfig) -> String {
    let placeholder = || config.placeholder_title.clone();
    if lines.is_empty() {
        return placeholder();
    }

    let first_page: Vec<&Line> = lines
        .iter()
        .filter(|l| l.page == 1 && l.text.trim().chars().count() > 3)
        .collect();
    if first_page.is_empty() {
        debug!("no usable first page line for the title");
        return high_score_fallback(lines, config).unwrap_or_else(placeholder);
    }

    let max_size = first_page
        .iter()
        .map(|l| l.font_size)
        .fold(f32::MIN, f32::max);
    let in_region = |l: &&&Line| l.y_pos() < config.title_region;

    let mut candidates: Vec<&Line> = first_page
        .iter()
        .filter(in_region)
        .filter(|l| l.font_size == max_size)
        .copied()
        .collect();
    if candidates.is_empty() {
        debug!("no max size title candidate, relaxing to 80% of {}", max_size);
        candidates = first_page
            .iter()
            .filter(in_region)
            .filter(|l| l.font_size >= max_size * 0.8)
            .copied()
            .collect();
    }
    if candidates.is_empty() {
        debug!("no title candidate near the top of the first page");
        return placeholder();
    }

    let page_width = page_info(pages, 0, config).width;
    candidates.sort_by(|a, b| {
        a.y_pos().total_cmp(&b.y_pos()).then(
            a.bbox
                .center_offset(page_width)
                .total_cmp(&b.bbox.center_offset(page_width)),
        )
    });

    let seed = candidates[0];
    let mut parts = vec![seed.text.trim()];
    let mut bottom = seed.bbox.y1;
    for candidate in &candidates[1..] {
        let continues = candidate.page == seed.page
            && (candidate.font_size as f64 - seed.font_size as f64).abs() < 1.5
            && (candidate.y_pos() as f64 - bottom as f64) < seed.font_size as f64 * 2.0
            && candidate.bbox.center_offset(page_width) < page_width as f64 * 0.15
            && !config.patterns.is_non_content(&candidate.text);
        if !continues {
            break;
        }
        parts.push(candidate.text.trim());
        bottom = candidate.bbox.y1;
    }

    let title = config.patterns.collapse_whitespace(&parts.join(" "));
    if !is_acceptable(&title, config) {
        debug!("rejected title {:?}", title);
        return high_score_fallback(lines, config).unwrap_or_else(placeholder);
    }

    debug!("extracted title {:?}", title);
    title
}
