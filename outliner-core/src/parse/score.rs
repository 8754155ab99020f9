use tracing::debug;

use crate::{
    config::OutlineConfig,
    entities::{Line, PageInfo},
};

/// Contribution of each signal to a line's heading score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub font_size: f32,
    pub bold: f32,
    pub pattern: f32,
    pub enumeration: f32,
    pub cue_word: f32,
    pub whitespace: f32,
    pub left_margin: f32,
    pub centered: f32,
    pub word_count: f32,
    pub capitalization: f32,
    pub ending: f32,
    pub first_page: f32,
    pub color: f32,
}

impl ScoreBreakdown {
    pub fn new(line: &Line, mean_font_size: f64, page: &PageInfo, config: &OutlineConfig) -> Self {
        let patterns = &config.patterns;
        let text = line.text.as_str();
        let body_size = mean_font_size;
        let max_words = config.max_heading_word_count;

        let font_size = if body_size > 0.0 {
            let ratio = line.font_size as f64 / body_size;
            if ratio >= 1.8 {
                50.0
            } else if ratio >= 1.5 {
                35.0
            } else if ratio > config.min_heading_font_ratio {
                25.0
            } else {
                0.0
            }
        } else {
            0.0
        };

        // whitespace below the line is not measured
        let whitespace_total = line.whitespace_above;
        let whitespace = if whitespace_total > body_size * 2.5 {
            15.0
        } else if whitespace_total > body_size * 1.5 {
            10.0
        } else if whitespace_total > body_size * 0.8 {
            5.0
        } else {
            0.0
        };

        let page_width = page.width as f64;
        let x_pos = line.x_pos as f64;
        let typical_left_margin = page_width * 0.12;
        let center_x = x_pos + (line.bbox.x1 as f64 - x_pos) / 2.0;

        let word_count = if (2..=max_words).contains(&line.word_count) {
            6.0
        } else if line.word_count > max_words + 10 {
            -30.0
        } else if line.word_count < 2 {
            -25.0
        } else {
            0.0
        };

        let capitalization =
            if line.cap_ratio == 1.0 && line.word_count as f32 <= max_words as f32 / 2f32 {
                12.0
            } else if is_title_case(text) && line.word_count <= max_words {
                8.0
            } else {
                0.0
            };

        let ending = if line.ends_with_period {
            -45.0
        } else if line.ends_with_colon {
            15.0
        } else {
            10.0
        };

        Self {
            font_size,
            bold: if line.is_bold { 45.0 } else { 0.0 },
            pattern: if patterns.matches_heading_pattern(text) {
                30.0
            } else {
                0.0
            },
            enumeration: if line.has_enumeration { 35.0 } else { 0.0 },
            cue_word: if line.has_cue_word { 10.0 } else { 0.0 },
            whitespace,
            left_margin: if (x_pos - typical_left_margin).abs() < 10.0 {
                10.0
            } else {
                0.0
            },
            centered: if (center_x - page_width / 2.0).abs() < page_width * 0.08 {
                12.0
            } else {
                0.0
            },
            word_count,
            capitalization,
            ending,
            first_page: if line.page == 1
                && line.y_pos() < 120f32
                && line.font_size as f64 >= body_size * 1.8
            {
                25.0
            } else {
                0.0
            },
            color: if line.color == 0 { 3.0 } else { 0.0 },
        }
    }

    pub fn total(&self) -> f32 {
        [
            self.font_size,
            self.bold,
            self.pattern,
            self.enumeration,
            self.cue_word,
            self.whitespace,
            self.left_margin,
            self.centered,
            self.word_count,
            self.capitalization,
            self.ending,
            self.first_page,
            self.color,
        ]
        .iter()
        .sum()
    }
}

/// Every cased character follows an uncased one if uppercase, a cased one if lowercase.
pub(crate) fn is_title_case(text: &str) -> bool {
    let mut has_cased = false;
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            has_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            has_cased = true;
        } else {
            prev_cased = false;
        }
    }
    has_cased
}

/// Heading likelihood of `line`. Unbounded and possibly negative; only meaningful relative to
/// the detection threshold.
pub fn score_line(line: &Line, mean_font_size: f64, page: &PageInfo, config: &OutlineConfig) -> f32 {
    if line.text.is_empty() {
        return 0f32;
    }
    let breakdown = ScoreBreakdown::new(line, mean_font_size, page, config);
    let score = breakdown.total();
    debug!(
        page = line.page,
        score,
        "scored {:?}: {:?}",
        line.text,
        breakdown
    );
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parse::ingest::mean_span_size,
        test_utils::{document, layout_line, line, page, PAGE_WIDTH},
    };

    const A4: PageInfo = PageInfo {
        width: 595.0,
        height: 842.0,
    };

    #[test]
    fn test_title_case() {
        assert!(is_title_case("Annual Report"));
        assert!(is_title_case("1. Introduction"));
        assert!(is_title_case("Terms Of Reference:"));
        assert!(!is_title_case("Terms of Reference"));
        assert!(!is_title_case("ANNUAL"));
        assert!(!is_title_case("123"));
    }

    #[test]
    fn test_large_bold_enumerated_heading() {
        let config = OutlineConfig::new().unwrap();
        let mut l = line("1. Introduction", 1, 50.0, 24.0);
        l.is_bold = true;
        l.has_enumeration = true;
        l.has_cue_word = true;
        l.whitespace_above = 50.0;

        let breakdown = ScoreBreakdown::new(&l, 13.0, &A4, &config);
        assert_eq!(breakdown.font_size, 50.0);
        assert_eq!(breakdown.bold, 45.0);
        assert_eq!(breakdown.pattern, 30.0);
        assert_eq!(breakdown.enumeration, 35.0);
        assert_eq!(breakdown.cue_word, 10.0);
        assert_eq!(breakdown.whitespace, 15.0);
        assert_eq!(breakdown.left_margin, 10.0);
        assert_eq!(breakdown.word_count, 6.0);
        assert_eq!(breakdown.capitalization, 8.0);
        assert_eq!(breakdown.ending, 10.0);
        assert_eq!(breakdown.first_page, 25.0);
        assert_eq!(breakdown.color, 3.0);
        assert!(score_line(&l, 13.0, &A4, &config) > config.heading_score_threshold);
    }

    #[test]
    fn test_body_sentence_below_threshold() {
        let config = OutlineConfig::new().unwrap();
        let l = line("The board approved the annual budget last month.", 1, 400.0, 12.0);
        assert_eq!(l.word_count, 8);
        let breakdown = ScoreBreakdown::new(&l, 12.0, &A4, &config);
        assert_eq!(breakdown.font_size, 0.0);
        assert_eq!(breakdown.ending, -45.0);
        assert!(score_line(&l, 12.0, &A4, &config) < config.heading_score_threshold);
    }

    #[test]
    fn test_font_tiers() {
        let config = OutlineConfig::new().unwrap();
        let tier = |size: f32| ScoreBreakdown::new(&line("Scope", 2, 300.0, size), 10.0, &A4, &config).font_size;
        assert_eq!(tier(18.0), 50.0);
        assert_eq!(tier(15.0), 35.0);
        assert_eq!(tier(13.5), 25.0);
        assert_eq!(tier(13.0), 0.0);
    }

    #[test]
    fn test_font_tier_boundary_uses_exact_mean() {
        let config = OutlineConfig::new().unwrap();
        let doc = document(vec![page(vec![
            layout_line("Scope", 72.0, 100.0, 24.0, true),
            layout_line("first note", 72.0, 200.0, 8.0, false),
            layout_line("second note", 72.0, 300.0, 8.0, false),
        ])]);
        let mean = mean_span_size(&doc, config.default_font_size);
        assert_eq!(mean, 40.0 / 3.0);
        // 24 / 13.333.. falls just short of 1.8 in double precision
        let l = line("Scope", 1, 100.0, 24.0);
        let breakdown = ScoreBreakdown::new(&l, mean, &A4, &config);
        assert_eq!(breakdown.font_size, 35.0);
        assert_eq!(breakdown.first_page, 0.0);
    }

    #[test]
    fn test_word_count_and_caps() {
        let config = OutlineConfig::new().unwrap();
        let words = |n: usize| vec!["word"; n].join(" ");
        let score = |text: &str| ScoreBreakdown::new(&line(text, 2, 300.0, 12.0), 12.0, &A4, &config);

        assert_eq!(score("Overview").word_count, -25.0);
        assert_eq!(score(&words(18)).word_count, 6.0);
        assert_eq!(score(&words(20)).word_count, 0.0);
        assert_eq!(score(&words(29)).word_count, -30.0);

        assert_eq!(score("OVERVIEW").capitalization, 12.0);
        // spaces count toward the length, so multi-word caps miss the all-caps bonus
        assert_eq!(score("GENERAL TERMS").capitalization, 0.0);
        assert_eq!(score("General Terms").capitalization, 8.0);
        assert_eq!(score("general terms").capitalization, 0.0);
    }

    #[test]
    fn test_centered_and_colored() {
        let config = OutlineConfig::new().unwrap();
        let mut l = line("Contents", 3, 300.0, 12.0);
        let width = l.bbox.x1 - l.bbox.x0;
        l.bbox.x0 = (PAGE_WIDTH - width) / 2.0;
        l.bbox.x1 = l.bbox.x0 + width;
        l.x_pos = l.bbox.x0;
        l.color = 0x333333;
        let breakdown = ScoreBreakdown::new(&l, 12.0, &A4, &config);
        assert_eq!(breakdown.centered, 12.0);
        assert_eq!(breakdown.left_margin, 0.0);
        assert_eq!(breakdown.color, 0.0);
        assert_eq!(breakdown.first_page, 0.0);
    }

    #[test]
    fn test_score_is_reproducible() {
        let config = OutlineConfig::new().unwrap();
        let mut l = line("Section 4: Requirements", 1, 90.0, 20.0);
        l.is_bold = true;
        l.has_cue_word = true;
        l.whitespace_above = 22.0;
        let first = score_line(&l, 11.3, &A4, &config);
        for _ in 0..10 {
            assert_eq!(score_line(&l.clone(), 11.3, &A4, &config), first);
        }
        assert_eq!(score_line(&line("", 1, 0.0, 20.0), 11.3, &A4, &config), 0.0);
    }
}
