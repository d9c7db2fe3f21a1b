//! Config command - manage the receipt configuration file.
//!
//! Works on the file given with the global `--config`, or on
//! `<config dir>/receipt-parser/config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use tracing::debug;

use receipt_core::{CategoryStore, CsvCategoryStore, ReceiptConfig};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configuration and the state of its mapping files
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Print one setting
    Get {
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Change one setting; mapping files are checked before they are saved
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        /// New value
        value: String,
    },

    /// Reset one setting to its default
    Unset {
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Master category mapping to record in the new file
    #[arg(long, value_name = "CSV")]
    master: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

/// Settings that can be read and changed from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConfigKey {
    #[value(name = "parser.store_name")]
    StoreName,
    #[value(name = "categories.path")]
    CategoryTable,
    #[value(name = "categories.master_path")]
    MasterMapping,
    #[value(name = "categories.interactive")]
    Interactive,
    #[value(name = "output.combined_file_name")]
    CombinedFileName,
    #[value(name = "output.file_suffix")]
    FileSuffix,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, config_path.map(PathBuf::from)),
        ConfigCommand::Get { key } => {
            println!("{}", get_value(&load_or_default(&path)?, key));
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut config = load_or_default(&path)?;
            set_value(&mut config, key, &value)?;
            save(&config, &path)?;
            println!("{} Set {:?} = {}", style("✓").green(), key_name(key), value);
            Ok(())
        }
        ConfigCommand::Unset { key } => {
            let mut config = load_or_default(&path)?;
            unset_value(&mut config, key)?;
            save(&config, &path)?;
            println!("{} Reset {:?}", style("✓").green(), key_name(key));
            Ok(())
        }
        ConfigCommand::Path => show_path(&path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("receipt-parser")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<ReceiptConfig> {
    if path.exists() {
        Ok(ReceiptConfig::from_file(path)?)
    } else {
        debug!("No config at {}, using defaults", path.display());
        Ok(ReceiptConfig::default())
    }
}

fn save(config: &ReceiptConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn key_name(key: ConfigKey) -> String {
    key.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn get_value(config: &ReceiptConfig, key: ConfigKey) -> String {
    let path_value = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    match key {
        ConfigKey::StoreName => config.parser.store_name.clone(),
        ConfigKey::CategoryTable => path_value(&config.categories.path),
        ConfigKey::MasterMapping => path_value(&config.categories.master_path),
        ConfigKey::Interactive => config.categories.interactive.to_string(),
        ConfigKey::CombinedFileName => config.output.combined_file_name.clone(),
        ConfigKey::FileSuffix => config.output.file_suffix.clone(),
    }
}

/// Validate `value` for `key` and store it in `config`.
fn set_value(config: &mut ReceiptConfig, key: ConfigKey, value: &str) -> anyhow::Result<()> {
    let value = value.trim();

    match key {
        ConfigKey::StoreName => {
            if value.is_empty() {
                anyhow::bail!("Store name cannot be empty");
            }
            config.parser.store_name = value.to_string();
        }
        ConfigKey::CategoryTable => {
            let path = PathBuf::from(value);
            check_mapping(&path)?;
            config.categories.path = Some(path);
        }
        ConfigKey::MasterMapping => {
            let path = PathBuf::from(value);
            check_mapping(&path)?;
            config.categories.master_path = Some(path);
        }
        ConfigKey::Interactive => {
            let interactive: bool = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected true or false, got {:?}", value))?;
            if interactive && config.categories.master_path.is_none() {
                anyhow::bail!("Interactive categorization needs categories.master_path to be set first");
            }
            config.categories.interactive = interactive;
        }
        ConfigKey::CombinedFileName => {
            if !value.ends_with(".csv") || has_separator(value) {
                anyhow::bail!("Combined file name must be a plain *.csv file name, got {:?}", value);
            }
            config.output.combined_file_name = value.to_string();
        }
        ConfigKey::FileSuffix => {
            if has_separator(value) {
                anyhow::bail!("File suffix cannot contain a path separator: {:?}", value);
            }
            config.output.file_suffix = value.to_string();
        }
    }

    Ok(())
}

fn unset_value(config: &mut ReceiptConfig, key: ConfigKey) -> anyhow::Result<()> {
    let defaults = ReceiptConfig::default();

    match key {
        ConfigKey::StoreName => config.parser.store_name = defaults.parser.store_name,
        ConfigKey::CategoryTable => config.categories.path = None,
        ConfigKey::MasterMapping => {
            if config.categories.interactive {
                anyhow::bail!("Disable categories.interactive before removing the master mapping");
            }
            config.categories.master_path = None;
        }
        ConfigKey::Interactive => config.categories.interactive = false,
        ConfigKey::CombinedFileName => {
            config.output.combined_file_name = defaults.output.combined_file_name
        }
        ConfigKey::FileSuffix => config.output.file_suffix = defaults.output.file_suffix,
    }

    Ok(())
}

fn has_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

/// Open and load a mapping file so a bad path or header fails now
/// rather than on the next run. Returns the number of entries.
fn check_mapping(path: &Path) -> anyhow::Result<usize> {
    let entries = CsvCategoryStore::open(path)?.load()?;
    debug!("{} holds {} categories", path.display(), entries.len());
    Ok(entries.len())
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    let mappings = [
        ("categories.path", &config.categories.path),
        ("categories.master_path", &config.categories.master_path),
    ];
    for (name, mapping) in mappings {
        let Some(mapping) = mapping else { continue };
        match check_mapping(mapping) {
            Ok(count) => println!("{} {}: {} categories", style("✓").green(), name, count),
            Err(e) => println!("{} {}: {}", style("✗").red(), name, e),
        }
    }

    Ok(())
}

fn init_config(args: InitArgs, global_path: Option<PathBuf>) -> anyhow::Result<()> {
    let output_path = args
        .output
        .or(global_path)
        .unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    let mut config = ReceiptConfig::default();
    if let Some(master) = args.master {
        check_mapping(&master)?;
        config.categories.master_path = Some(master);
    }
    save(&config, &output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'receipt config init' to create a configuration file.");
    }

    Ok(())
}
