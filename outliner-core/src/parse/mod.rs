//! The outline pipeline, one module per stage, sequenced by [`document::OutlineExtractor`].
pub mod document;
pub mod features;
pub mod header_footer;
pub mod ingest;
pub mod levels;
pub mod merge;
pub mod score;
pub mod select;
pub mod titles;
