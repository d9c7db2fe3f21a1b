//! Configuration structures for receipt processing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the receipt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Line-item parser configuration.
    pub parser: ParserConfig,

    /// Item categorization configuration.
    pub categories: CategoryConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Receipt parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Store name written to every extracted line.
    pub store_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            store_name: "Walmart".to_string(),
        }
    }
}

/// Categorization configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Read-only category table; unmatched items fall back to keyword rules.
    pub path: Option<PathBuf>,

    /// Appendable master mapping; unmatched items are tracked for resolution.
    pub master_path: Option<PathBuf>,

    /// Prompt for categories of unmatched items (requires `master_path`).
    pub interactive: bool,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the combined table written by batch processing.
    pub combined_file_name: String,

    /// Suffix appended to the PDF stem for single-file output.
    pub file_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            combined_file_name: "combined_receipts.csv".to_string(),
            file_suffix: "_parsed".to_string(),
        }
    }
}

impl ReceiptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
