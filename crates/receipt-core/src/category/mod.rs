//! Item categorization against an exact-match mapping.

mod categorizer;
mod store;

pub use categorizer::{Categorizer, CategoryMap, FallbackStrategy, KEYWORD_CATEGORIES};
pub use store::{CategoryStore, CsvCategoryStore, MemoryCategoryStore, MAPPING_HEADERS};

use serde::{Deserialize, Serialize};

use crate::receipt::rules::collapse_whitespace;

/// Category value of items without a mapping.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A (category, sub-category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemCategory {
    pub category: String,
    #[serde(rename = "sub-category")]
    pub sub_category: String,
}

impl ItemCategory {
    pub fn new(category: impl Into<String>, sub_category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            sub_category: sub_category.into(),
        }
    }

    /// The pair assigned to items nothing matched.
    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED, UNCATEGORIZED)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED && self.sub_category == UNCATEGORIZED
    }
}

/// One row of the category mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    /// Item name as written in the mapping (display form).
    pub item: String,
    pub category: ItemCategory,
}

impl CategoryEntry {
    pub fn new(item: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            item: item.into(),
            category,
        }
    }

    /// Lookup key of this entry.
    pub fn key(&self) -> String {
        normalize_item(&self.item)
    }
}

/// Lookup key for an item name: lowercase with whitespace collapsed.
pub fn normalize_item(name: &str) -> String {
    collapse_whitespace(&name.to_lowercase())
}

/// Supplies categories for items the mapping does not know.
///
/// Returning `None` skips the item: it stays uncategorized and nothing
/// is persisted.
pub trait CategoryResolver {
    fn resolve(&mut self, item: &str) -> Option<ItemCategory>;
}

impl<F> CategoryResolver for F
where
    F: FnMut(&str) -> Option<ItemCategory>,
{
    fn resolve(&mut self, item: &str) -> Option<ItemCategory> {
        self(item)
    }
}
