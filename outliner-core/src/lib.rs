pub mod batch;
pub mod config;
pub mod entities;
pub mod error;
pub mod layout;
pub mod parse;

#[cfg(test)]
pub(crate) mod test_utils;

pub use batch::{run_batch, BatchReport, DocumentReport};
pub use config::OutlineConfig;
pub use entities::{DocumentOutline, HeadingLevel, OutlineEntry};
pub use error::OutlineError;
pub use layout::{pdfium::PdfiumLayoutSource, LayoutDocument, LayoutSource};
pub use parse::document::OutlineExtractor;
