//! Common regex patterns for Walmart receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Order date as printed in the receipt header: "Mar 24, 2024"
    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"([A-Z][a-z]{2}\s+\d{2},\s+\d{4})"
    ).unwrap();

    // Numeric US date: "03/24/2024"
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"
    ).unwrap();

    // Digit runs in a file name; only runs of exactly eight are dates
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"\d+"
    ).unwrap();

    // Itemized purchase quantities
    pub static ref SHOPPED_QTY: Regex = Regex::new(
        r"Shopped Qty (\d+)"
    ).unwrap();

    pub static ref SHOPPED_WT: Regex = Regex::new(
        r"Shopped Wt (\d+\.\d+)"
    ).unwrap();

    // Price with integer part: "$3.50"
    pub static ref PRICE: Regex = Regex::new(
        r"\$(\d+\.\d{2})"
    ).unwrap();

    // Price whose integer part may be missing: "$.99"
    pub static ref PRICE_LOOSE: Regex = Regex::new(
        r"\$(\d*\.\d{2})"
    ).unwrap();

    // Weighed produce
    pub static ref FRESH_NAME: Regex = Regex::new(
        r"Fresh ([^,]+)"
    ).unwrap();

    pub static ref WEIGHT_LB: Regex = Regex::new(
        r"(\d+\.\d+)\s*lb"
    ).unwrap();
}
