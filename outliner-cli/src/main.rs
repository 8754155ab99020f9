use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use outliner_core::{batch::eligible_documents, run_batch, OutlineConfig, PdfiumLayoutSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Outliner - title and heading outline extraction for PDF documents",
    long_about = "Outliner reads every PDF in a directory and writes, for each one, a JSON file holding the inferred document title and a three-level (H1/H2/H3) heading outline with page numbers."
)]
struct Args {
    /// Directory scanned for input documents
    #[arg(
        long,
        env = "OUTLINER_INPUT_DIR",
        default_value = "/app/input",
        help = "Specify the directory holding the documents to outline"
    )]
    input_dir: PathBuf,

    /// One `<name>.json` per input document lands here; created if missing
    #[arg(
        long,
        env = "OUTLINER_OUTPUT_DIR",
        default_value = "/app/output",
        help = "Specify the directory to store outline results"
    )]
    output_dir: PathBuf,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("outliner_core=info,outliner=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn setup_progress_bar(length: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .context("invalid progress bar template")?
        .progress_chars("#>-"),
    );
    Ok(pb)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let source = PdfiumLayoutSource::new().context("can't initialize the PDF reader")?;
    let config = OutlineConfig::new().context("can't build outline configuration")?;

    let documents = eligible_documents(&source, &args.input_dir)?;
    let pb = setup_progress_bar(documents.len())?;
    let pbc = pb.clone();

    let report = run_batch(
        &source,
        &args.input_dir,
        &args.output_dir,
        config,
        move |doc| {
            let name = doc
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if doc.ingest_failed {
                pbc.println(format!("{} {}", "✗".red().bold(), name));
            }
            pbc.set_message(name);
            pbc.inc(1u64);
        },
    )
    .with_context(|| format!("outline batch over {} failed", args.input_dir.display()))?;

    pb.finish_and_clear();

    let summary = format!(
        "Outlined {} documents ({} failed)",
        report.processed, report.failed
    );
    if report.failed == 0 {
        println!("{} {}", "✓".green().bold(), summary);
    } else {
        println!("{} {}", "!".yellow().bold(), summary);
    }
    println!(
        "Results saved in: {}",
        args.output_dir.display().to_string().cyan().underline()
    );
    Ok(())
}
