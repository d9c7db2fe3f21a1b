//! Subcommands and the pieces they share.

pub mod batch;
pub mod config;
pub mod process;
mod prompt;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use receipt_core::models::receipt::ReceiptLine;
use receipt_core::{Categorizer, ReceiptConfig, ReceiptTable};

/// Categorization flags shared by `process` and `batch`.
#[derive(Args, Clone, Debug, Default)]
pub struct CategoryArgs {
    /// Read-only category table (Item,Category,Sub-Category); unmatched items use keyword rules
    #[arg(long, value_name = "CSV")]
    categories: Option<PathBuf>,

    /// Master category mapping; unmatched items are tracked and can be added to it
    #[arg(long, value_name = "CSV", conflicts_with = "categories")]
    master: Option<PathBuf>,

    /// Prompt for the category of each unmatched item (requires --master)
    #[arg(short, long)]
    interactive: bool,
}

/// Load the config file if one was given, otherwise defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReceiptConfig> {
    Ok(match config_path {
        Some(path) => ReceiptConfig::from_file(Path::new(path))?,
        None => ReceiptConfig::default(),
    })
}

/// Categorization for one run: flags take precedence over the config file.
pub struct CategoryStep {
    categorizer: Categorizer,
    interactive: bool,
}

impl CategoryStep {
    /// Build the categorizer, or `None` when no mapping was configured.
    pub fn from_args(args: &CategoryArgs, config: &ReceiptConfig) -> anyhow::Result<Option<Self>> {
        let interactive = args.interactive || config.categories.interactive;
        let (master, table) = if args.master.is_some() || args.categories.is_some() {
            (args.master.clone(), args.categories.clone())
        } else {
            (
                config.categories.master_path.clone(),
                config.categories.path.clone(),
            )
        };

        let categorizer = if let Some(master) = master {
            debug!("Using master mapping {}", master.display());
            Categorizer::open_master(&master)?
        } else if let Some(table) = table {
            if interactive {
                anyhow::bail!("Interactive categorization needs a master mapping (--master)");
            }
            debug!("Using category table {}", table.display());
            Categorizer::from_csv(&table)?
        } else {
            if interactive {
                anyhow::bail!("Interactive categorization needs a master mapping (--master)");
            }
            return Ok(None);
        };

        Ok(Some(Self {
            categorizer,
            interactive,
        }))
    }

    /// Categorize one receipt's lines, prompting for unknowns when interactive.
    pub fn apply(&mut self, lines: Vec<ReceiptLine>) -> anyhow::Result<ReceiptTable> {
        let rows = if self.interactive {
            let mut resolver = prompt::prompt_category;
            self.categorizer.categorize_table(lines, Some(&mut resolver))?
        } else {
            self.categorizer.categorize_table(lines, None)?
        };
        Ok(ReceiptTable::Categorized(rows))
    }
}

/// Categorize if a step is configured, otherwise keep the plain lines.
pub fn to_table(step: Option<&mut CategoryStep>, lines: Vec<ReceiptLine>) -> anyhow::Result<ReceiptTable> {
    match step {
        Some(step) => step.apply(lines),
        None => Ok(ReceiptTable::Lines(lines)),
    }
}
