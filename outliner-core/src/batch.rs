use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{error, info, instrument};

use crate::{
    config::OutlineConfig,
    entities::DocumentOutline,
    error::{OutlineError, Result},
    layout::LayoutSource,
    parse::document::OutlineExtractor,
};

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Title and number of outline entries written.
    pub title: String,
    pub entries: usize,
    pub ingest_failed: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub processed: usize,
    /// Documents that could not be loaded; a placeholder outline was written for each.
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
}

/// Regular files directly inside `input_dir` that `source` accepts, in file name order.
pub fn eligible_documents(source: &dyn LayoutSource, input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir).map_err(|e| OutlineError::io(input_dir, e))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| OutlineError::io(input_dir, e))?.path();
        if path.is_file() && source.accepts(&path) {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// `<output_dir>/<stem>.json`
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    output_dir.join(format!("{stem}.json"))
}

pub fn save_outline(outline: &DocumentOutline, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| OutlineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, outline).map_err(|source| {
        OutlineError::Serialize {
            path: path.to_owned(),
            source,
        }
    })?;
    writer.flush().map_err(|e| OutlineError::io(path, e))
}

/// Extract and save the outline of every eligible document in `input_dir`.
///
/// A document that fails to load is logged and gets the placeholder outline; the batch moves
/// on. Failing to write an output aborts the run. `on_document` is called after each document
/// is saved.
#[instrument(skip(source, config, on_document))]
pub fn run_batch(
    source: &dyn LayoutSource,
    input_dir: &Path,
    output_dir: &Path,
    config: OutlineConfig,
    mut on_document: impl FnMut(&DocumentReport),
) -> Result<BatchReport> {
    let documents = eligible_documents(source, input_dir)?;
    if documents.is_empty() {
        return Err(OutlineError::NoInputDocuments {
            dir: input_dir.to_owned(),
        });
    }
    info!("found {} documents to process", documents.len());

    fs::create_dir_all(output_dir).map_err(|e| OutlineError::io(output_dir, e))?;

    let mut extractor = OutlineExtractor::new(config);
    let mut report = BatchReport::default();

    for input in documents {
        let (outline, ingest_failed) = match extractor.process_file(source, &input) {
            Ok(outline) => (outline, false),
            Err(err @ OutlineError::Ingest { .. }) => {
                error!("{err}");
                (
                    DocumentOutline::placeholder(&extractor.config().placeholder_title),
                    true,
                )
            }
            Err(err) => return Err(err),
        };

        let output = output_path(&input, output_dir);
        save_outline(&outline, &output)?;
        info!("wrote {}", output.display());

        report.processed += 1;
        if ingest_failed {
            report.failed += 1;
        }
        on_document(&DocumentReport {
            input,
            output: output.clone(),
            title: outline.title,
            entries: outline.outline.len(),
            ingest_failed,
        });
        report.outputs.push(output);
    }

    info!(
        "batch done: {} processed, {} failed",
        report.processed, report.failed
    );
    Ok(report)
}
