//! Batch processing command for a directory of invoice files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::debug;

use invx_core::batch::{discover_documents, process_document, DocumentOutcome};
use invx_core::document::detect_format;
use invx_core::{BatchProcessor, FieldExtractor};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern (default: configured input directory)
    input: Option<String>,

    /// Output CSV file (default: configured output path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Placeholder for fields that were not found
    #[arg(long)]
    sentinel: Option<String>,

    /// Leave out documents where no field was found
    #[arg(long)]
    skip_empty: bool,

    /// Prefix each row with the file name
    #[arg(long)]
    with_filename: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if let Some(output) = args.output.clone() {
        config.batch.output_path = output;
    }
    if let Some(sentinel) = args.sentinel.clone() {
        config.extraction.sentinel = sentinel;
    }
    config.batch.skip_empty |= args.skip_empty;
    config.batch.include_filename |= args.with_filename;

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.batch.input_dir.display().to_string());
    let files = collect_files(&input)?;

    if files.is_empty() {
        println!(
            "{} No PDF or DOCX files found in {}",
            style("!").yellow(),
            input
        );
    } else {
        println!(
            "{} Found {} files to process",
            style("ℹ").blue(),
            files.len()
        );
    }

    let extractor = Arc::new(config.extraction.build_extractor()?);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let outcomes = if args.jobs > 1 {
        debug!("Processing with {} workers", args.jobs);
        process_parallel(&files, &extractor, args.jobs, &progress).await?
    } else {
        files
            .iter()
            .map(|path| {
                let outcome = process_document(&extractor, path);
                progress.inc(1);
                (path.clone(), outcome)
            })
            .collect()
    };

    progress.finish_and_clear();

    let extractor = Arc::try_unwrap(extractor).unwrap_or_else(|shared| (*shared).clone());
    let processor = BatchProcessor::new(config.batch.clone(), extractor);
    let report = processor.assemble(outcomes);

    // Failing to write the output is fatal
    processor.write_output(&report)?;

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.processed(),
        start.elapsed()
    );
    println!(
        "   {} written, {} skipped, {} failed",
        style(report.records.len()).green(),
        style(report.skipped.len()).yellow(),
        style(report.failures.len()).red()
    );
    println!(
        "{} Output written to {}",
        style("✓").green(),
        config.batch.output_path.display()
    );

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &report.failures {
            println!("  - {}: {}", failure.path.display(), failure.error);
        }
    }

    Ok(())
}

/// Files named by `input`: the supported documents in a directory, a single
/// supported file, or the supported matches of a glob pattern. Sorted by path.
/// A missing path or a pattern without matches is an error.
fn collect_files(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        return Ok(discover_documents(path)?);
    }

    if !input.contains(&['*', '?', '['][..]) {
        if !path.is_file() {
            anyhow::bail!("Input not found: {}", input);
        }
        detect_format(path)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = glob(input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && detect_format(p).is_ok())
        .collect();
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", input);
    }
    files.sort();
    Ok(files)
}

/// Read and extract on blocking workers, at most `jobs` at a time.
/// Outcomes come back in the order of `files`.
async fn process_parallel(
    files: &[PathBuf],
    extractor: &Arc<FieldExtractor>,
    jobs: usize,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<(PathBuf, DocumentOutcome)>> {
    let semaphore = Arc::new(Semaphore::new(jobs));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let extractor = Arc::clone(extractor);
        let path = path.clone();
        let progress = progress.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let outcome = process_document(&extractor, &path);
            progress.inc(1);
            drop(permit);
            (path, outcome)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await?);
    }
    Ok(outcomes)
}
