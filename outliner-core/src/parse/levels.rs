use itertools::Itertools;
use tracing::{debug, instrument};

use crate::{
    config::OutlineConfig,
    entities::{FontStatistics, Heading, HeadingLevel, Line, PageInfo},
};

use super::ingest::page_info;

/// Assigns H1/H2/H3 from the font sizes of the whole heading set plus enumeration and
/// indentation cues.
#[derive(Debug)]
pub struct LevelClassifier<'a> {
    /// Distinct heading sizes, largest first.
    size_ranks: Vec<f32>,
    body_font_size: f32,
    pages: &'a [PageInfo],
    config: &'a OutlineConfig,
}

impl<'a> LevelClassifier<'a> {
    pub fn new(
        headings: &[Line],
        stats: Option<&FontStatistics>,
        pages: &'a [PageInfo],
        config: &'a OutlineConfig,
    ) -> Self {
        let size_ranks = headings
            .iter()
            .map(|h| h.font_size)
            .sorted_by(|a, b| b.total_cmp(a))
            .dedup()
            .collect();
        Self {
            size_ranks,
            body_font_size: stats
                .map(|s| s.body_font_size)
                .unwrap_or(config.default_font_size),
            pages,
            config,
        }
    }

    /// Level implied by font size alone: largest H1, second H2, anything else H3.
    pub fn size_level(&self, font_size: f32) -> HeadingLevel {
        match self.size_ranks.iter().position(|&s| s == font_size) {
            Some(0) => HeadingLevel::H1,
            Some(1) => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Level forced by a leading enumeration, if any.
    fn enumeration_level(&self, heading: &Line, default: HeadingLevel) -> Option<HeadingLevel> {
        let patterns = &self.config.patterns;
        let text = heading.text.as_str();

        if patterns.level_three_part.is_match(text) {
            Some(HeadingLevel::H3)
        } else if patterns.level_two_part.is_match(text) {
            Some(match default {
                HeadingLevel::H1 => HeadingLevel::H1,
                _ => HeadingLevel::H2,
            })
        } else if patterns.level_single.is_match(text) || patterns.level_roman.is_match(text) {
            let prominent = heading.font_size as f64 >= self.body_font_size as f64 * 1.8;
            Some(if prominent && default == HeadingLevel::H1 {
                HeadingLevel::H1
            } else {
                HeadingLevel::H2
            })
        } else if patterns.level_letter_paren.is_match(text)
            || patterns.level_letter_dot.is_match(text)
        {
            Some(HeadingLevel::H3)
        } else {
            None
        }
    }

    pub fn classify(&self, heading: &Line) -> HeadingLevel {
        let default = self.size_level(heading.font_size);

        if let Some(level) = self.enumeration_level(heading, default) {
            debug!("{:?} classified {:?} by enumeration", heading.text, level);
            return level;
        }

        let page_width = page_info(self.pages, heading.page.saturating_sub(1), self.config).width;
        // first fragment's left edge, even after a merge widened the box
        let indent_threshold = page_width as f64 * 0.1 + 30.0;
        if heading.x_pos as f64 > indent_threshold {
            let level = default.demote();
            debug!(
                "{:?} indented ({:.2} > {:.2}), {:?} -> {:?}",
                heading.text,
                heading.x_pos,
                indent_threshold,
                default,
                level
            );
            return level;
        }

        debug!("{:?} classified {:?} by font size", heading.text, default);
        default
    }
}

/// Attach a level to every merged heading, ranking sizes across the full set.
#[instrument(skip_all)]
pub fn classify_levels(
    headings: Vec<Line>,
    stats: Option<&FontStatistics>,
    pages: &[PageInfo],
    config: &OutlineConfig,
) -> Vec<Heading> {
    let classifier = LevelClassifier::new(&headings, stats, pages, config);
    headings
        .into_iter()
        .map(|line| Heading {
            level: classifier.classify(&line),
            line,
        })
        .collect()
}
