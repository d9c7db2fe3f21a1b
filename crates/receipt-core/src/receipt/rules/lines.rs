//! Classification of single receipt lines into line items.

use super::normalize::{collapse_whitespace, normalize_price};
use super::patterns::{FRESH_NAME, PRICE, PRICE_LOOSE, SHOPPED_QTY, SHOPPED_WT, WEIGHT_LB};

/// Marker of an itemized purchase line.
const SHOPPED: &str = "Shopped";

/// Which rule a line was classified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// "<item> Shopped Qty 2 ... $3.50"
    Purchase,
    /// "Fresh Bananas, each 1.25 lb ... $0.75"
    Produce,
    /// "Tax 1 ... $0.42" (never a subtotal line)
    Tax,
}

impl LineKind {
    /// Select the rule for a line. Rules are tried in order and the first
    /// one whose marker text is present owns the line, even if it then
    /// fails to extract a record.
    pub fn select(line: &str) -> Option<Self> {
        if line.contains(SHOPPED) {
            Some(Self::Purchase)
        } else if line.contains("Fresh") && line.contains("lb") {
            Some(Self::Produce)
        } else if line.contains("Tax") && !line.contains("Subtotal") {
            Some(Self::Tax)
        } else {
            None
        }
    }
}

/// Fields extracted from one classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub kind: LineKind,
    pub item: String,
    pub qty_wgt: String,
    pub price: String,
}

/// Classify a line and extract its item, quantity/weight and price.
///
/// Returns `None` for lines no rule owns, and for owned lines missing a
/// required field. A price is always required.
pub fn classify_line(line: &str) -> Option<LineMatch> {
    match LineKind::select(line)? {
        LineKind::Purchase => purchase(line),
        LineKind::Produce => produce(line),
        LineKind::Tax => tax(line),
    }
}

fn purchase(line: &str) -> Option<LineMatch> {
    let price = first_price(line)?;
    let item = line.split(SHOPPED).next().unwrap_or_default();

    let qty_wgt = if let Some(caps) = SHOPPED_QTY.captures(line) {
        caps[1].to_string()
    } else if let Some(caps) = SHOPPED_WT.captures(line) {
        format!("{} lb", &caps[1])
    } else {
        String::new()
    };

    Some(LineMatch {
        kind: LineKind::Purchase,
        item: collapse_whitespace(item),
        qty_wgt,
        price,
    })
}

fn produce(line: &str) -> Option<LineMatch> {
    let name = FRESH_NAME.captures(line)?;
    let weight = WEIGHT_LB.captures(line)?;
    let price = PRICE_LOOSE.captures(line)?;

    Some(LineMatch {
        kind: LineKind::Produce,
        item: collapse_whitespace(&format!("Fresh {}", &name[1])),
        qty_wgt: format!("{} lb", &weight[1]),
        price: normalize_price(&price[1]),
    })
}

fn tax(line: &str) -> Option<LineMatch> {
    Some(LineMatch {
        kind: LineKind::Tax,
        item: "Tax".to_string(),
        qty_wgt: String::new(),
        price: first_price(line)?,
    })
}

fn first_price(line: &str) -> Option<String> {
    PRICE.captures(line).map(|caps| normalize_price(&caps[1]))
}
