use tracing::{info, instrument};

use crate::{
    config::OutlineConfig,
    entities::{cap_ratio, round2, Line, PageInfo},
    layout::LayoutDocument,
};

use super::{
    header_footer::HfCensus,
    ingest::{mean_span_size, page_info, reading_order, RawLine},
};

/// Surviving lines of a document and the mean span size they were measured against.
#[derive(Debug, Clone)]
pub struct ExtractedLines {
    pub lines: Vec<Line>,
    pub mean_font_size: f64,
}

/// Compute the features of one surviving line. `prev_bottom` is the bottom edge of the
/// previous line on the same page, redundant lines included.
pub fn line_features(
    raw: &RawLine<'_>,
    seq_idx: usize,
    prev_bottom: f32,
    mean_font_size: f64,
    config: &OutlineConfig,
) -> Line {
    let patterns = &config.patterns;
    let text = raw.text.clone();
    let trimmed = text.trim();

    let lead = raw.layout.lead_span();
    let font_size = lead.map(|s| s.size).unwrap_or_default();
    let rel_font_size = if mean_font_size > 0.0 {
        round2(font_size as f64 / mean_font_size)
    } else {
        0.0
    };

    Line {
        page: raw.page_idx + 1,
        bbox: raw.bbox,
        x_pos: raw.bbox.x0,
        font_size,
        font_name: lead.map(|s| s.font.clone()).unwrap_or_default(),
        is_bold: lead.is_some_and(|s| s.is_bold()),
        is_italic: lead.is_some_and(|s| s.is_italic()),
        color: lead.map(|s| s.color).unwrap_or_default(),
        rel_font_size,
        whitespace_above: round2(raw.bbox.y0 as f64 - prev_bottom as f64).max(0.0),
        seq_idx,
        word_count: text.split_whitespace().count(),
        cap_ratio: cap_ratio(&text),
        ends_with_period: trimmed.ends_with('.'),
        ends_with_colon: trimmed.ends_with(':'),
        has_enumeration: patterns.enumeration.is_match(&text),
        has_cue_word: patterns.has_cue_word(&text),
        heading_score: 0f32,
        text,
    }
}

/// Walk the document in reading order, drop redundant lines and compute features for the rest.
#[instrument(skip_all)]
pub fn extract_lines(
    doc: &LayoutDocument,
    pages: &[PageInfo],
    census: &HfCensus,
    config: &OutlineConfig,
) -> ExtractedLines {
    let mean_font_size = mean_span_size(doc, config.default_font_size);
    info!("document mean font size: {:.2}", mean_font_size);

    let mut lines = Vec::new();
    let mut current_page = None;
    let mut prev_bottom = 0f32;

    for raw in reading_order(doc) {
        if current_page != Some(raw.page_idx) {
            current_page = Some(raw.page_idx);
            prev_bottom = 0f32;
        }

        let info = page_info(pages, raw.page_idx, config);
        if census.is_redundant(&raw.text, &raw.bbox, &info, config) {
            prev_bottom = raw.bbox.y1;
            continue;
        }

        lines.push(line_features(
            &raw,
            lines.len(),
            prev_bottom,
            mean_font_size,
            config,
        ));
        prev_bottom = raw.bbox.y1;
    }

    info!(
        "extracted {} meaningful lines after filtering redundant content",
        lines.len()
    );
    ExtractedLines {
        lines,
        mean_font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::LayoutSpan,
        parse::ingest::page_infos,
        test_utils::{document, layout_line, page},
    };

    fn extract(doc: &LayoutDocument) -> ExtractedLines {
        let config = OutlineConfig::new().unwrap();
        let pages = page_infos(doc, &config);
        let census = HfCensus::build(doc, &pages, &config);
        extract_lines(doc, &pages, &census, &config)
    }

    #[test]
    fn test_features() {
        let mut heading = layout_line("1. Introduction", 72.0, 100.0, 24.0, true);
        heading.spans.push(LayoutSpan {
            text: "(draft)".into(),
            size: 8.0,
            ..Default::default()
        });
        let doc = document(vec![page(vec![
            heading,
            layout_line("Scope of work:", 72.0, 150.0, 12.0, false),
        ])]);

        let extracted = extract(&doc);
        // the draft marker makes the heading non-content
        assert_eq!(extracted.lines.len(), 1);
        assert!((extracted.mean_font_size - 44.0 / 3.0).abs() < 1e-4);

        let line = &extracted.lines[0];
        assert_eq!(line.text, "Scope of work:");
        assert_eq!(line.seq_idx, 0);
        assert_eq!(line.rel_font_size, 0.82);
        assert!(line.ends_with_colon);
        assert!(!line.ends_with_period);
        assert!(line.has_cue_word);
        assert!(!line.has_enumeration);
        assert_eq!(line.word_count, 3);
        assert_eq!(line.cap_ratio, 0.07);
        assert_eq!(line.x_pos, 72.0);
        // measured from the bottom of the dropped line above it
        assert_eq!(line.whitespace_above, 150.0 - 124.0);
    }

    #[test]
    fn test_style_from_lead_span() {
        let mut l = layout_line("II General Provisions", 72.0, 100.0, 18.0, true);
        l.spans[0].flags |= crate::layout::SPAN_FLAG_ITALIC;
        l.spans[0].color = 0x00ff00;
        let doc = document(vec![page(vec![l])]);
        let line = &extract(&doc).lines[0];
        assert!(line.is_bold);
        assert!(line.is_italic);
        assert_eq!(line.color, 0x00ff00);
        assert_eq!(line.font_name, "Helvetica-Bold");
        assert_eq!(line.page, 1);
        assert_eq!(line.whitespace_above, 100.0);
    }

    #[test]
    fn test_seq_idx_and_whitespace_reset_per_page() {
        let doc = document(vec![
            page(vec![
                layout_line("Budget overview", 72.0, 100.0, 12.0, false),
                layout_line("Budget details", 72.0, 110.0, 12.0, false),
            ]),
            page(vec![layout_line("Appendix tables", 72.0, 60.0, 12.0, false)]),
        ]);
        let lines = extract(&doc).lines;
        assert_eq!(
            lines.iter().map(|l| l.seq_idx).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        // overlapping lines floor at zero
        assert_eq!(lines[1].whitespace_above, 0.0);
        assert_eq!(lines[2].whitespace_above, 60.0);
        assert_eq!(lines[2].page, 2);
    }

    #[test]
    fn test_enumeration_feature() {
        let config = OutlineConfig::new().unwrap();
        let doc = document(vec![page(vec![
            layout_line("2.1 Background", 72.0, 100.0, 12.0, false),
            layout_line("(b) Eligibility rules", 72.0, 200.0, 12.0, false),
            layout_line("Eligibility rules apply", 72.0, 300.0, 12.0, false),
        ])]);
        let pages = page_infos(&doc, &config);
        let census = HfCensus::build(&doc, &pages, &config);
        let lines = extract_lines(&doc, &pages, &census, &config).lines;
        assert!(lines[0].has_enumeration);
        assert!(lines[1].has_enumeration);
        assert!(!lines[2].has_enumeration);
    }
}
