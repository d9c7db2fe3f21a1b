//! Core library for Walmart receipt processing.
//!
//! This crate provides:
//! - PDF processing (first-page text extraction)
//! - Line-item extraction from receipt text (purchases, weighed produce, tax)
//! - Item categorization backed by an append-only CSV mapping
//! - CSV export and combination of extracted tables

pub mod error;
pub mod models;
pub mod pdf;
pub mod receipt;
pub mod category;
pub mod export;

pub use error::{ReceiptError, Result};
pub use models::receipt::{CategorizedLine, ReceiptLine, UNKNOWN_DATE};
pub use pdf::{PdfExtractor, PdfProcessor, ReceiptDocument, read_receipt};
pub use models::config::ReceiptConfig;
pub use receipt::{ParseResult, ReceiptParser, WalmartReceiptParser};
pub use category::{
    Categorizer, CategoryEntry, CategoryMap, CategoryResolver, CategoryStore, CsvCategoryStore,
    FallbackStrategy, ItemCategory, MemoryCategoryStore, UNCATEGORIZED,
};
pub use export::{combine_tables, read_table, ReceiptTable};
