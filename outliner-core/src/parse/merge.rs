use tracing::{debug, info, instrument};

use crate::{
    config::OutlineConfig,
    entities::{cap_ratio, Line},
};

/// Why two consecutive headings were kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeBreak {
    PageChange,
    VerticalGap,
    FontSizeJump,
    SentenceEnd,
    NextEnumerated,
    BothTooLong,
    NeitherBold,
}

/// First break condition that holds between the running heading and the next line.
pub fn merge_break(current: &Line, next: &Line, config: &OutlineConfig) -> Option<MergeBreak> {
    let long_line = config.max_heading_word_count + 5;

    if current.page != next.page {
        Some(MergeBreak::PageChange)
    } else if next.y_pos() as f64 - current.bbox.y1 as f64 >= current.font_size as f64 * 1.5 {
        Some(MergeBreak::VerticalGap)
    } else if (current.font_size as f64 - next.font_size as f64).abs() >= 2.0 {
        Some(MergeBreak::FontSizeJump)
    } else if current.ends_with_period
        && !config
            .patterns
            .enumeration_period
            .is_match(current.text.trim())
    {
        Some(MergeBreak::SentenceEnd)
    } else if next.has_enumeration {
        Some(MergeBreak::NextEnumerated)
    } else if current.word_count > long_line && next.word_count > long_line {
        Some(MergeBreak::BothTooLong)
    } else if !current.is_bold
        && !next.is_bold
        && current.font_size < current.font_size * 1.5
    {
        Some(MergeBreak::NeitherBold)
    } else {
        None
    }
}

/// Fold `next` into `current`. Page, left position, sequence index, font name, colour and
/// relative size stay those of the first fragment.
pub fn absorb(current: Line, next: Line) -> Line {
    let text = format!("{} {}", current.text, next.text.trim());
    let mut bbox = current.bbox;
    bbox.merge(&next.bbox);

    Line {
        cap_ratio: cap_ratio(&text),
        text,
        bbox,
        font_size: current.font_size.max(next.font_size),
        is_bold: current.is_bold || next.is_bold,
        is_italic: current.is_italic || next.is_italic,
        word_count: current.word_count + next.word_count,
        ends_with_period: next.ends_with_period,
        ends_with_colon: next.ends_with_colon,
        has_enumeration: current.has_enumeration || next.has_enumeration,
        has_cue_word: current.has_cue_word || next.has_cue_word,
        heading_score: current.heading_score.max(next.heading_score),
        ..current
    }
}

/// Coalesce headings split over consecutive lines.
#[instrument(skip_all)]
pub fn merge_multiline(headings: Vec<Line>, config: &OutlineConfig) -> Vec<Line> {
    let mut sorted = headings;
    sorted.sort_by(|a, b| a.spatial_cmp(b));

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let (mut merged, last) = iter.fold((Vec::new(), first), |(mut merged, current), next| {
        match merge_break(&current, &next, config) {
            Some(reason) => {
                debug!("{:?}: keeping {:?} apart from {:?}", reason, current.text, next.text);
                merged.push(current);
                (merged, next)
            }
            None => {
                debug!("merging {:?} with {:?}", current.text, next.text);
                (merged, absorb(current, next))
            }
        }
    });
    merged.push(last);

    info!("headings after multi-line merge: {}", merged.len());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::BBox,
        test_utils::{heading, line},
    };

    #[test]
    fn test_merges_wrapped_heading() {
        let config = OutlineConfig::new().unwrap();
        let mut first = heading("Ontario Digital Library", 1, 100.0, 20.0, 110.0);
        first.has_cue_word = false;
        let mut second = heading("Business Plan:", 1, 122.0, 19.0, 130.0);
        second.bbox.x0 = 60.0;
        second.x_pos = 60.0;
        second.ends_with_colon = true;
        second.is_italic = true;

        let merged = merge_multiline(vec![second, first], &config);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.text, "Ontario Digital Library Business Plan:");
        assert_eq!(m.bbox.x0, 60.0);
        assert_eq!(m.x_pos, 72.0);
        assert_eq!(m.bbox.y0, 100.0);
        assert_eq!(m.bbox.y1, 141.0);
        assert_eq!(m.font_size, 20.0);
        assert_eq!(m.word_count, 5);
        assert_eq!(m.heading_score, 130.0);
        assert!(m.ends_with_colon);
        assert!(m.is_italic);
        assert_eq!(m.cap_ratio, cap_ratio("Ontario Digital Library Business Plan:"));
    }

    #[test]
    fn test_break_conditions() {
        let config = OutlineConfig::new().unwrap();
        let current = heading("Mission Statement", 1, 100.0, 20.0, 100.0);
        let next = |f: fn(&mut Line)| {
            let mut l = heading("And Values", 1, 125.0, 20.0, 100.0);
            f(&mut l);
            l
        };

        assert_eq!(merge_break(&current, &next(|_| {}), &config), None);
        assert_eq!(
            merge_break(&current, &next(|l| l.page = 2), &config),
            Some(MergeBreak::PageChange)
        );
        assert_eq!(
            merge_break(&current, &next(|l| l.bbox = BBox::new(72.0, 150.0, 200.0, 170.0)), &config),
            Some(MergeBreak::VerticalGap)
        );
        assert_eq!(
            merge_break(&current, &next(|l| l.font_size = 18.0), &config),
            Some(MergeBreak::FontSizeJump)
        );
        assert_eq!(
            merge_break(&current, &next(|l| l.has_enumeration = true), &config),
            Some(MergeBreak::NextEnumerated)
        );
        assert_eq!(
            merge_break(&current, &next(|l| l.is_bold = false), &config),
            None
        );

        let mut plain = current.clone();
        plain.is_bold = false;
        assert_eq!(
            merge_break(&plain, &next(|l| l.is_bold = false), &config),
            Some(MergeBreak::NeitherBold)
        );
        // a zero size is never smaller than one and a half times itself
        let unsized_current = line("Notes Page", 1, 100.0, 0.0);
        let unsized_next = line("Continued Here", 1, 99.0, 0.0);
        assert_eq!(merge_break(&unsized_current, &unsized_next, &config), None);

        let mut long = current.clone();
        long.word_count = 24;
        assert_eq!(
            merge_break(&long, &next(|l| l.word_count = 24), &config),
            Some(MergeBreak::BothTooLong)
        );
    }

    #[test]
    fn test_period_breaks_unless_enumeration() {
        let config = OutlineConfig::new().unwrap();
        let next = heading("Introduction", 1, 125.0, 20.0, 100.0);

        let mut sentence = heading("Scope of the plan.", 1, 100.0, 20.0, 100.0);
        sentence.ends_with_period = true;
        assert_eq!(
            merge_break(&sentence, &next, &config),
            Some(MergeBreak::SentenceEnd)
        );

        let mut numbered = heading("Chapter 1.", 1, 100.0, 20.0, 100.0);
        numbered.ends_with_period = true;
        assert_eq!(merge_break(&numbered, &next, &config), None);
    }

    #[test]
    fn test_emits_every_group_in_order() {
        let config = OutlineConfig::new().unwrap();
        let headings = vec![
            heading("Part One Of", 1, 100.0, 20.0, 100.0),
            heading("The Report", 1, 122.0, 20.0, 100.0),
            heading("Part Two", 1, 400.0, 20.0, 100.0),
            heading("Part Three", 2, 100.0, 20.0, 100.0),
        ];
        let texts: Vec<_> = merge_multiline(headings, &config)
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(texts, vec!["Part One Of The Report", "Part Two", "Part Three"]);
        assert!(merge_multiline(Vec::new(), &config).is_empty());
    }
}
