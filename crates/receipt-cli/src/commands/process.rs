//! Process command - extract line items from a single receipt PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use receipt_core::{ReceiptParser, ReceiptTable, WalmartReceiptParser};

use super::{load_config, to_table, CategoryArgs, CategoryStep};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file ("-" for stdout; default: <name>_parsed.<ext> in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[command(flatten)]
    categories: CategoryArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV output
    Csv,
    /// JSON output
    Json,
    /// Plain text table
    Text,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = WalmartReceiptParser::new().with_store_name(&config.parser.store_name);
    let result = parser.parse_file(&args.input)?;

    let mut step = CategoryStep::from_args(&args.categories, &config)?;
    let table = to_table(step.as_mut(), result.lines)?;

    let output = format_table(&table, args.format)?;

    match args.output.as_deref() {
        Some(path) if path == Path::new("-") => print!("{}", output),
        Some(path) => write_output(path, &output)?,
        None => {
            let path = default_output_path(&args.input, &config.output.file_suffix, args.format);
            write_output(&path, &output)?;
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn write_output(path: &Path, output: &str) -> anyhow::Result<()> {
    fs::write(path, output)?;
    println!(
        "{} Parsed receipt saved to: {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn default_output_path(input: &Path, suffix: &str, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    PathBuf::from(format!("{}{}.{}", stem, suffix, format.extension()))
}

pub fn format_table(table: &ReceiptTable, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => Ok(table.to_csv_string()?),
        OutputFormat::Json => Ok(match table {
            ReceiptTable::Lines(rows) => serde_json::to_string_pretty(rows)?,
            ReceiptTable::Categorized(rows) => serde_json::to_string_pretty(rows)?,
        }),
        OutputFormat::Text => Ok(format_text(table)),
    }
}

fn format_text(table: &ReceiptTable) -> String {
    let mut output = String::new();

    match table {
        ReceiptTable::Lines(rows) => {
            for row in rows {
                output.push_str(&format!(
                    "{}  {:<40} {:>10} {:>8}\n",
                    row.date, row.item, row.qty_wgt, row.price
                ));
            }
        }
        ReceiptTable::Categorized(rows) => {
            for row in rows {
                output.push_str(&format!(
                    "{}  {:<40} {:>10} {:>8}  {} / {}\n",
                    row.line.date,
                    row.line.item,
                    row.line.qty_wgt,
                    row.line.price,
                    row.category.category,
                    row.category.sub_category
                ));
            }
        }
    }

    output.push_str(&format!("\n{} items\n", table.len()));
    output
}
