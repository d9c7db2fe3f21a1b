//! Persistence of the category mapping.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{CategoryEntry, ItemCategory};
use crate::error::{ReceiptError, Result};

/// Header of the mapping CSV. Names are case-sensitive.
pub const MAPPING_HEADERS: [&str; 3] = ["Item", "Category", "Sub-Category"];

/// Backing storage for category entries.
///
/// Stores are append-only: existing rows are never rewritten.
pub trait CategoryStore {
    /// Load every stored entry in file order.
    fn load(&self) -> Result<Vec<CategoryEntry>>;

    /// Append one entry.
    fn append(&mut self, entry: &CategoryEntry) -> Result<()>;
}

/// Category mapping stored in a CSV file with an `Item,Category,Sub-Category` header.
#[derive(Debug, Clone)]
pub struct CsvCategoryStore {
    path: PathBuf,
}

impl CsvCategoryStore {
    /// Open an existing mapping file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(ReceiptError::MappingFileMissing(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn schema_error(&self, reason: impl Into<String>) -> ReceiptError {
        ReceiptError::MappingSchema {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn reader(&self) -> Result<csv::Reader<fs::File>> {
        Ok(csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?)
    }

    /// Write a newline first if the file does not end with one, so the
    /// appended row starts on its own line.
    fn terminate_last_line(file: &mut fs::File) -> Result<()> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(());
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.seek(SeekFrom::End(0))?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl CategoryStore for CsvCategoryStore {
    fn load(&self) -> Result<Vec<CategoryEntry>> {
        let mut reader = self.reader()?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            debug!("Mapping {} is empty", self.path.display());
            return Ok(Vec::new());
        }

        let mut columns = [0usize; 3];
        for (slot, name) in columns.iter_mut().zip(MAPPING_HEADERS) {
            *slot = headers.iter().position(|h| h == name).ok_or_else(|| {
                self.schema_error(format!(
                    "missing column {:?} (expected header {})",
                    name,
                    MAPPING_HEADERS.join(",")
                ))
            })?;
        }
        let [item_col, category_col, sub_col] = columns;

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let item = record.get(item_col).unwrap_or_default();
            if item.is_empty() {
                warn!("Skipping mapping row {} without an item name", row + 2);
                continue;
            }

            entries.push(CategoryEntry::new(
                item,
                ItemCategory::new(
                    record.get(category_col).unwrap_or_default(),
                    record.get(sub_col).unwrap_or_default(),
                ),
            ));
        }

        debug!("Loaded {} category rows from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    fn append(&mut self, entry: &CategoryEntry) -> Result<()> {
        // Same header test as `load`, so a file it reads as empty gets a header
        let has_header = !self.reader()?.headers()?.is_empty();

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        if has_header {
            Self::terminate_last_line(&mut file)?;
        } else {
            file.set_len(0)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !has_header {
            writer.write_record(MAPPING_HEADERS)?;
        }
        writer.write_record([
            entry.item.as_str(),
            entry.category.category.as_str(),
            entry.category.sub_category.as_str(),
        ])?;
        writer.flush()?;

        debug!("Appended {:?} to {}", entry.item, self.path.display());
        Ok(())
    }
}

/// In-memory store, useful when nothing should touch the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryCategoryStore {
    entries: Vec<CategoryEntry>,
}

impl MemoryCategoryStore {
    pub fn new(entries: Vec<CategoryEntry>) -> Self {
        Self { entries }
    }

    /// Every row, including appended ones.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }
}

impl CategoryStore for MemoryCategoryStore {
    fn load(&self) -> Result<Vec<CategoryEntry>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &CategoryEntry) -> Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
