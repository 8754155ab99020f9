use std::path::Path;

use tracing::{info, instrument, warn};

use super::{
    features::{extract_lines, ExtractedLines},
    header_footer::HfCensus,
    ingest::{page_info, page_infos},
    levels::classify_levels,
    merge::merge_multiline,
    score::score_line,
    select::select_candidates,
    titles::extract_title,
};
use crate::{
    config::OutlineConfig,
    entities::{DocumentOutline, FontStatistics, OutlineEntry, PageInfo},
    error::OutlineError,
    layout::{LayoutDocument, LayoutSource},
};

/// Everything learned about the document currently being processed.
#[derive(Debug, Default)]
struct DocumentState {
    pages: Vec<PageInfo>,
    census: HfCensus,
}

/// Infers a title and a three-level outline from a document's layout.
///
/// One extractor processes documents one after the other; its per-document state is reset at
/// the start of every run so nothing leaks from one document into the next.
#[derive(Debug)]
pub struct OutlineExtractor {
    config: OutlineConfig,
    state: DocumentState,
}

impl OutlineExtractor {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            state: DocumentState::default(),
        }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    fn reset_state(&mut self) {
        self.state = DocumentState::default();
        info!("extractor state reset");
    }

    /// Run the whole pipeline over an in-memory layout.
    #[instrument(skip_all, fields(pages = doc.page_count()))]
    pub fn extract(&mut self, doc: &LayoutDocument) -> DocumentOutline {
        self.reset_state();
        let config = &self.config;

        self.state.pages = page_infos(doc, config);
        self.state.census = HfCensus::build(doc, &self.state.pages, config);
        let pages = &self.state.pages;

        let ExtractedLines {
            mut lines,
            mean_font_size,
        } = extract_lines(doc, pages, &self.state.census, config);
        if lines.is_empty() {
            warn!("no meaningful text lines in document");
            return DocumentOutline::placeholder(&config.placeholder_title);
        }

        let font_stats = FontStatistics::from_lines(&lines);

        for line in lines.iter_mut() {
            let page = page_info(pages, line.page - 1, config);
            line.heading_score = score_line(line, mean_font_size, &page, config);
        }

        let candidates = select_candidates(&lines, config);
        let mut merged = merge_multiline(candidates, config);
        merged.sort_by(|a, b| a.spatial_cmp(b));
        let headings = classify_levels(merged, font_stats.as_ref(), pages, config);

        let title = extract_title(&lines, pages, config);
        let outline: Vec<OutlineEntry> = headings.iter().map(OutlineEntry::from).collect();

        info!(
            "extracted title {:?} with {} outline entries",
            title,
            outline.len()
        );
        DocumentOutline { title, outline }
    }

    /// Load `path` through `source` and extract its outline.
    pub fn process_file(
        &mut self,
        source: &dyn LayoutSource,
        path: &Path,
    ) -> Result<DocumentOutline, OutlineError> {
        info!("processing {}", path.display());
        let doc = source.load(path).map_err(|source| OutlineError::Ingest {
            path: path.to_owned(),
            source,
        })?;
        Ok(self.extract(&doc))
    }
}
