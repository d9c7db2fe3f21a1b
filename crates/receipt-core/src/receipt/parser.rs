//! Walmart receipt parser turning page text into line items.

use std::path::Path;

use tracing::{debug, info, trace};

use crate::models::receipt::ReceiptLine;
use crate::pdf::{read_receipt, ReceiptDocument};

use super::rules::{classify_line, resolve_date};

/// Result of parsing one receipt page.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Extracted lines in the order they appear on the page.
    pub lines: Vec<ReceiptLine>,
    /// Date attached to every line.
    pub date: String,
    /// Number of non-blank lines that produced no record.
    pub skipped_lines: usize,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse the text of a receipt's first page.
    ///
    /// `file_name` is consulted only when the text carries no date.
    fn parse(&self, text: &str, file_name: Option<&str>) -> ParseResult;

    /// Parse an already extracted document.
    fn parse_document(&self, document: &ReceiptDocument) -> ParseResult {
        self.parse(&document.text, Some(&document.file_name))
    }

    /// Read and parse the receipt PDF at `path`.
    fn parse_file(&self, path: &Path) -> crate::Result<ParseResult> {
        let document = read_receipt(path)?;
        Ok(self.parse_document(&document))
    }
}

/// Parser for the Walmart order receipt layout.
pub struct WalmartReceiptParser {
    /// Store name written to every line.
    store_name: String,
}

impl WalmartReceiptParser {
    /// Create a parser with the default store name.
    pub fn new() -> Self {
        Self {
            store_name: "Walmart".to_string(),
        }
    }

    /// Set the store name written to every line.
    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = store_name.into();
        self
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }
}

impl Default for WalmartReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for WalmartReceiptParser {
    fn parse(&self, text: &str, file_name: Option<&str>) -> ParseResult {
        let date = resolve_date(text, file_name);

        let mut lines = Vec::new();
        let mut skipped_lines = 0;

        for raw in text.lines() {
            if raw.trim().is_empty() {
                continue;
            }

            match classify_line(raw) {
                Some(m) => {
                    debug!("{:?} line: {} [{}] ${}", m.kind, m.item, m.qty_wgt, m.price);
                    lines.push(ReceiptLine {
                        date: date.clone(),
                        store: self.store_name.clone(),
                        item: m.item,
                        qty_wgt: m.qty_wgt,
                        price: m.price,
                    });
                }
                None => {
                    trace!("No record from line: {:?}", raw);
                    skipped_lines += 1;
                }
            }
        }

        info!(
            "Extracted {} lines dated {} ({} skipped)",
            lines.len(),
            date,
            skipped_lines
        );

        ParseResult {
            lines,
            date,
            skipped_lines,
        }
    }
}
