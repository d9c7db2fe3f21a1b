//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{PdfError, ReceiptError};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Text of a receipt's first page together with its file name.
#[derive(Debug, Clone)]
pub struct ReceiptDocument {
    /// File name of the source, used for date fallback.
    pub file_name: String,
    /// Extracted text of the first page.
    pub text: String,
}

/// Read the first page of the receipt PDF at `path`.
///
/// Any failure to open, parse or extract is reported as
/// [`ReceiptError::SourceUnreadable`] naming `path`.
pub fn read_receipt(path: &Path) -> crate::Result<ReceiptDocument> {
    let data = fs::read(path).map_err(|e| ReceiptError::unreadable(path, e))?;

    let mut extractor = PdfExtractor::new();
    extractor
        .load(&data)
        .map_err(|e| ReceiptError::unreadable(path, e))?;

    let text = extractor
        .extract_page_text(1)
        .map_err(|e| ReceiptError::unreadable(path, e))?;

    debug!("Read {} chars from first page of {}", text.len(), path.display());

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ReceiptDocument { file_name, text })
}
