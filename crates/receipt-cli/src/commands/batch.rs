//! Batch processing command for multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use receipt_core::{
    combine_tables, read_table, ReceiptConfig, ReceiptParser, ReceiptTable, WalmartReceiptParser,
};

use super::{load_config, to_table, CategoryArgs, CategoryStep};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory of receipt PDFs, or a glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-receipt CSV files
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Also combine every CSV in the output directory into one table sorted by date
    #[arg(long)]
    combine: bool,

    #[command(flatten)]
    categories: CategoryArgs,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    rows: Option<usize>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_input(&args.input)?;

    fs::create_dir_all(&args.output_dir)?;

    if files.is_empty() {
        println!(
            "{} No PDF files found for {}",
            style("ℹ").blue(),
            args.input
        );
    } else {
        println!(
            "{} Found {} files to process",
            style("ℹ").blue(),
            files.len()
        );
    }

    let mut step = CategoryStep::from_args(&args.categories, &config)?;
    let parser = WalmartReceiptParser::new().with_store_name(&config.parser.store_name);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Documents are processed one at a time so prompts stay in order
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &parser, step.as_mut(), &args.output_dir, &overall_pb);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(rows) => results.push(ProcessResult {
                path,
                rows: Some(rows),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                overall_pb.suspend(|| warn!("Failed to process {}: {}", path.display(), error_msg));
                results.push(ProcessResult {
                    path,
                    rows: None,
                    error: Some(error_msg),
                    processing_time_ms,
                });
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if args.combine {
        let combined_path = combine_directory(&args.output_dir, &config)?;
        println!(
            "{} Combined receipts saved to {}",
            style("✓").green(),
            combined_path.display()
        );
    }

    print_summary(&results, start);
    Ok(())
}

/// Resolve a directory or glob pattern to the PDF files it names.
fn expand_input(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        Path::new(input).join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn process_single_file(
    path: &Path,
    parser: &WalmartReceiptParser,
    step: Option<&mut CategoryStep>,
    output_dir: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<usize> {
    let result = parser.parse_file(path)?;
    if result.lines.is_empty() {
        debug!("No line items found in {}", path.display());
    }

    // Keep prompts readable while the bar is drawn
    let table = pb.suspend(|| to_table(step, result.lines))?;

    let output_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let output_path = output_dir.join(format!("{}.csv", output_name));

    table.write_file(&output_path)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(table.len())
}

/// Combine every receipt CSV in `output_dir` into the configured combined file.
fn combine_directory(output_dir: &Path, config: &ReceiptConfig) -> anyhow::Result<PathBuf> {
    let combined_path = output_dir.join(&config.output.combined_file_name);

    let mut inputs: Vec<PathBuf> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().is_some_and(|e| e == "csv") && *p != combined_path
        })
        .collect();
    inputs.sort();

    let mut tables = Vec::with_capacity(inputs.len());
    for path in inputs {
        match read_table(&path) {
            Ok(table) => tables.push(table),
            Err(e) => warn!("Skipping {} in combined output: {}", path.display(), e),
        }
    }

    let combined: ReceiptTable = combine_tables(tables);
    combined.write_file(&combined_path)?;
    debug!("Combined {} rows into {}", combined.len(), combined_path.display());

    Ok(combined_path)
}

fn print_summary(results: &[ProcessResult], start: Instant) {
    let successful: Vec<_> = results.iter().filter(|r| r.rows.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let total_rows: usize = successful.iter().filter_map(|r| r.rows).sum();

    println!();
    println!(
        "{} Processed {} files ({} line items) in {:?}",
        style("✓").green(),
        results.len(),
        total_rows,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    for result in &successful {
        debug!(
            "{}: {} rows in {}ms",
            result.path.display(),
            result.rows.unwrap_or_default(),
            result.processing_time_ms
        );
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
