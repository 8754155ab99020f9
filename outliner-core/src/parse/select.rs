use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::{config::OutlineConfig, entities::Line};

/// Text used to recognise the same heading twice: whitespace-collapsed and lower-cased.
fn dedup_key(line: &Line, config: &OutlineConfig) -> String {
    config.patterns.collapse_whitespace(&line.text).to_lowercase()
}

/// A candidate hugging the previously accepted heading with the same look is a rendering
/// duplicate of it.
fn is_rendering_duplicate(candidate: &Line, last: &Line) -> bool {
    last.page == candidate.page
        && (candidate.y_pos() as f64 - last.bbox.y1 as f64) < candidate.font_size as f64 * 0.8
        && (candidate.font_size as f64 - last.font_size as f64).abs() < 1.0
        && candidate.is_bold == last.is_bold
}

/// Threshold, deduplicate and cap scored lines. The result is in `(page, y)` order.
#[instrument(skip_all)]
pub fn select_candidates(lines: &[Line], config: &OutlineConfig) -> Vec<Line> {
    let mut candidates: Vec<&Line> = lines
        .iter()
        .filter(|l| l.heading_score >= config.heading_score_threshold)
        .collect();
    info!(
        "initial heading candidates (score >= {}): {}",
        config.heading_score_threshold,
        candidates.len()
    );

    // strongest first so that ties on position keep the better candidate ahead
    candidates.sort_by(|a, b| b.heading_score.total_cmp(&a.heading_score));
    candidates.sort_by(|a, b| a.spatial_cmp(b));

    let mut accepted: Vec<Line> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let key = dedup_key(candidate, config);
        if key.chars().count() < config.min_heading_len || seen.contains(&key) {
            debug!("skipping short or seen candidate: {:?}", candidate.text);
            continue;
        }
        if accepted
            .last()
            .is_some_and(|last| is_rendering_duplicate(candidate, last))
        {
            debug!("skipping close duplicate candidate: {:?}", candidate.text);
            continue;
        }

        accepted.push(candidate.clone());
        seen.insert(key);

        if accepted.len() >= config.max_headings {
            info!("reached heading cap of {}", config.max_headings);
            break;
        }
    }

    info!(
        "headings after filtering and deduplication: {}",
        accepted.len()
    );
    accepted
}
