//! CSV export and combination of receipt tables.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::category::ItemCategory;
use crate::error::{ReceiptError, Result};
use crate::models::receipt::{
    CategorizedLine, ReceiptLine, CATEGORIZED_HEADERS, LINE_HEADERS, UNKNOWN_DATE,
};

/// Rows of one output table, with or without categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptTable {
    Lines(Vec<ReceiptLine>),
    Categorized(Vec<CategorizedLine>),
}

impl ReceiptTable {
    pub fn len(&self) -> usize {
        match self {
            Self::Lines(rows) => rows.len(),
            Self::Categorized(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorized(&self) -> bool {
        matches!(self, Self::Categorized(_))
    }

    /// Write the table as CSV with its fixed header row.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        match self {
            Self::Lines(rows) => {
                wtr.write_record(LINE_HEADERS)?;
                for row in rows {
                    wtr.write_record(row.fields())?;
                }
            }
            Self::Categorized(rows) => {
                wtr.write_record(CATEGORIZED_HEADERS)?;
                for row in rows {
                    wtr.write_record(row.fields())?;
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file, replacing any existing file.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Render the table as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ReceiptError::Io(std::io::Error::other(e)))
    }
}

/// Read a table previously written by [`ReceiptTable::write_file`].
pub fn read_table(path: &Path) -> Result<ReceiptTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns: Vec<&str> = headers.iter().collect();

    let shape_error = || ReceiptError::TableShape {
        path: path.to_path_buf(),
        columns: columns.join(","),
    };

    if columns == LINE_HEADERS {
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(line_from_record(&record).ok_or_else(shape_error)?);
        }
        Ok(ReceiptTable::Lines(rows))
    } else if columns == CATEGORIZED_HEADERS {
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = line_from_record(&record).ok_or_else(shape_error)?;
            let category = ItemCategory::new(
                record.get(5).unwrap_or_default(),
                record.get(6).unwrap_or_default(),
            );
            rows.push(line.categorized(category));
        }
        Ok(ReceiptTable::Categorized(rows))
    } else {
        Err(shape_error())
    }
}

fn line_from_record(record: &csv::StringRecord) -> Option<ReceiptLine> {
    Some(ReceiptLine::new(
        record.get(0)?,
        record.get(1)?,
        record.get(2)?,
        record.get(3)?,
        record.get(4)?,
    ))
}

/// Concatenate tables and order the rows by date.
///
/// The sort is stable, so rows of one receipt keep their order. Rows dated
/// `Unknown` go last. If any input is categorized the result is too, with
/// empty categories for rows that had none.
pub fn combine_tables(tables: Vec<ReceiptTable>) -> ReceiptTable {
    let categorized = tables.iter().any(ReceiptTable::is_categorized);

    if !categorized {
        let mut rows: Vec<ReceiptLine> = tables
            .into_iter()
            .flat_map(|table| match table {
                ReceiptTable::Lines(rows) => rows,
                ReceiptTable::Categorized(_) => Vec::new(),
            })
            .collect();
        rows.sort_by(|a, b| date_key(&a.date).cmp(&date_key(&b.date)));
        return ReceiptTable::Lines(rows);
    }

    let mut rows: Vec<CategorizedLine> = tables
        .into_iter()
        .flat_map(|table| match table {
            ReceiptTable::Lines(rows) => rows
                .into_iter()
                .map(|line| line.categorized(ItemCategory::new("", "")))
                .collect(),
            ReceiptTable::Categorized(rows) => rows,
        })
        .collect();
    rows.sort_by(|a, b| date_key(&a.line.date).cmp(&date_key(&b.line.date)));
    ReceiptTable::Categorized(rows)
}

fn date_key(date: &str) -> (bool, &str) {
    (date == UNKNOWN_DATE, date)
}
