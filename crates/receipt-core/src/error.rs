//! Error types for the receipt-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the receipt library.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// The source document could not be opened or decoded.
    #[error("cannot read receipt {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The configured category mapping file does not exist.
    #[error("category mapping file not found: {}", .0.display())]
    MappingFileMissing(PathBuf),

    /// The category mapping file has an unexpected header.
    #[error("invalid category mapping {}: {reason}", path.display())]
    MappingSchema { path: PathBuf, reason: String },

    /// A receipt table does not have the five- or seven-column layout.
    #[error("unexpected columns in {}: {columns}", path.display())]
    TableShape { path: PathBuf, columns: String },

    /// An operation needs configuration that was not supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

impl ReceiptError {
    /// Wrap a lower-level failure as an unreadable source at `path`.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for the receipt library.
pub type Result<T> = std::result::Result<T, ReceiptError>;
