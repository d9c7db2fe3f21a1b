//! Date resolution for Walmart receipts.

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::{DATE_MDY, DATE_MONTH_NAME, DIGIT_RUN};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::receipt::UNKNOWN_DATE;

/// Date field extractor for receipt text.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    /// First date in priority order: any month-name date beats any numeric one.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_MONTH_NAME.captures_iter(text) {
            let full_match = caps.get(0).unwrap();
            if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%b %d, %Y") {
                results.push(ExtractionMatch::new(date, full_match.as_str()));
            }
        }

        for caps in DATE_MDY.captures_iter(text) {
            let month: u32 = caps[1].parse().unwrap_or(0);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let full_match = caps.get(0).unwrap();
                results.push(ExtractionMatch::new(date, full_match.as_str()));
            }
        }

        results
    }
}

/// Parse the first eight-digit run in a file name as `YYYYMMDD`.
///
/// Returns `Some(None)` when a run exists but is not a calendar date,
/// and `None` when the name holds no eight-digit run at all.
fn date_from_file_name(file_name: &str) -> Option<Option<NaiveDate>> {
    let run = DIGIT_RUN
        .find_iter(file_name)
        .map(|m| m.as_str())
        .find(|digits| digits.len() == 8)?;

    let year: i32 = run[0..4].parse().ok()?;
    let month: u32 = run[4..6].parse().ok()?;
    let day: u32 = run[6..8].parse().ok()?;

    Some(NaiveDate::from_ymd_opt(year, month, day))
}

/// Resolve the single transaction date of a receipt page.
///
/// Returns `YYYY-MM-DD`, or [`UNKNOWN_DATE`] when nothing usable is found.
pub fn resolve_date(text: &str, file_name: Option<&str>) -> String {
    if let Some(found) = DateExtractor::new().extract(text) {
        debug!("Receipt date {} from text {:?}", found.value, found.source);
        return format_date(found.value);
    }

    match file_name.and_then(date_from_file_name) {
        Some(Some(date)) => {
            debug!("Receipt date {} from file name {:?}", date, file_name);
            format_date(date)
        }
        Some(None) => {
            debug!("File name {:?} has an invalid YYYYMMDD run", file_name);
            UNKNOWN_DATE.to_string()
        }
        None => UNKNOWN_DATE.to_string(),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
