//! Receipt line-item models and their fixed CSV column layout.

use serde::{Deserialize, Serialize};

use crate::category::ItemCategory;

/// Date value used when a receipt carries no recognizable date.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Column headers of an uncategorized output table.
pub const LINE_HEADERS: [&str; 5] = ["date", "store", "item", "qty_wgt", "price"];

/// Column headers of a categorized output table.
pub const CATEGORIZED_HEADERS: [&str; 7] = [
    "date",
    "store",
    "item",
    "qty_wgt",
    "price",
    "category",
    "sub-category",
];

/// One purchased item (or the tax line) extracted from a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Purchase date as `YYYY-MM-DD`, or [`UNKNOWN_DATE`].
    pub date: String,

    /// Store name, constant per parser.
    pub store: String,

    /// Item name with whitespace collapsed.
    pub item: String,

    /// Quantity (`"2"`), weight (`"1.25 lb"`), or empty.
    pub qty_wgt: String,

    /// Price as a decimal string with a leading digit (`"0.99"`).
    pub price: String,
}

impl ReceiptLine {
    pub fn new(
        date: impl Into<String>,
        store: impl Into<String>,
        item: impl Into<String>,
        qty_wgt: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            store: store.into(),
            item: item.into(),
            qty_wgt: qty_wgt.into(),
            price: price.into(),
        }
    }

    /// Attach a category to this line.
    pub fn categorized(self, category: ItemCategory) -> CategorizedLine {
        CategorizedLine { line: self, category }
    }

    pub(crate) fn fields(&self) -> [&str; 5] {
        [&self.date, &self.store, &self.item, &self.qty_wgt, &self.price]
    }
}

/// A receipt line with its assigned category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedLine {
    #[serde(flatten)]
    pub line: ReceiptLine,

    #[serde(flatten)]
    pub category: ItemCategory,
}

impl CategorizedLine {
    pub(crate) fn fields(&self) -> [&str; 7] {
        let [date, store, item, qty_wgt, price] = self.line.fields();
        [
            date,
            store,
            item,
            qty_wgt,
            price,
            &self.category.category,
            &self.category.sub_category,
        ]
    }
}
