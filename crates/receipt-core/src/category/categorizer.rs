//! Exact-match categorizer with keyword or unknown-tracking fallback.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use super::store::{CategoryStore, CsvCategoryStore};
use super::{normalize_item, CategoryEntry, CategoryResolver, ItemCategory};
use crate::error::{ReceiptError, Result};
use crate::models::receipt::{CategorizedLine, ReceiptLine};

/// Substring rules used by [`FallbackStrategy::Keywords`], tried in order.
pub const KEYWORD_CATEGORIES: [(&str, &str, &str); 8] = [
    ("fresh", "Grocery", "Veggies"),
    ("frozen", "Grocery", "Frozen"),
    ("chicken", "Grocery", "Meat"),
    ("beef", "Grocery", "Meat"),
    ("toilet paper", "Supplies", "Personal Care"),
    ("toothpaste", "Supplies", "Personal Care"),
    ("wipes", "Supplies", "Cleaning"),
    ("tax", "Tax", "Tax"),
];

/// What happens to items the mapping does not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Guess from [`KEYWORD_CATEGORIES`]; used with read-only tables.
    Keywords,
    /// Record the item for later resolution; used with a backing store.
    TrackUnknown,
}

/// In-memory mapping from normalized item name to category.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: HashMap<String, ItemCategory>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map; a later entry for the same key replaces an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.insert(entry);
        }
        map
    }

    pub fn insert(&mut self, entry: CategoryEntry) {
        self.entries.insert(entry.key(), entry.category);
    }

    /// Look up an item by name; the name is normalized first.
    pub fn get(&self, item: &str) -> Option<&ItemCategory> {
        self.entries.get(&normalize_item(item))
    }

    pub fn contains(&self, item: &str) -> bool {
        self.get(item).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assigns categories to items and grows the mapping as unknowns are resolved.
pub struct Categorizer {
    map: CategoryMap,
    store: Option<Box<dyn CategoryStore>>,
    strategy: FallbackStrategy,
    unknown_items: Vec<String>,
    /// Unknown items before this index were already offered to a resolver.
    offered: usize,
}

impl Categorizer {
    /// Categorizer over a static table with keyword fallback.
    pub fn from_entries(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        Self {
            map: CategoryMap::from_entries(entries),
            store: None,
            strategy: FallbackStrategy::Keywords,
            unknown_items: Vec::new(),
            offered: 0,
        }
    }

    /// Categorizer over a read-only CSV table with keyword fallback.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let entries = CsvCategoryStore::open(path)?.load()?;
        info!("Loaded {} categories from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    /// Categorizer backed by an appendable store; unmatched items are tracked.
    pub fn with_store(store: impl CategoryStore + 'static) -> Result<Self> {
        let map = CategoryMap::from_entries(store.load()?);
        Ok(Self {
            map,
            store: Some(Box::new(store)),
            strategy: FallbackStrategy::TrackUnknown,
            unknown_items: Vec::new(),
            offered: 0,
        })
    }

    /// Categorizer backed by the master mapping CSV at `path`.
    pub fn open_master(path: &Path) -> Result<Self> {
        let categorizer = Self::with_store(CsvCategoryStore::open(path)?)?;
        info!(
            "Loaded {} categories from master mapping {}",
            categorizer.map.len(),
            path.display()
        );
        Ok(categorizer)
    }

    pub fn strategy(&self) -> FallbackStrategy {
        self.strategy
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }

    /// Items seen without a mapping, in first-seen order.
    pub fn unknown_items(&self) -> &[String] {
        &self.unknown_items
    }

    /// Categorize one item name.
    pub fn categorize(&mut self, item: &str) -> ItemCategory {
        if let Some(category) = self.map.get(item) {
            return category.clone();
        }

        match self.strategy {
            FallbackStrategy::TrackUnknown => {
                if !self.unknown_items.iter().any(|known| known == item) {
                    debug!("Unknown item: {}", item);
                    self.unknown_items.push(item.to_string());
                }
                ItemCategory::uncategorized()
            }
            FallbackStrategy::Keywords => keyword_category(&normalize_item(item)),
        }
    }

    /// Add or replace a mapping and append it to the backing store.
    pub fn add_category(&mut self, item: &str, category: &str, sub_category: &str) -> Result<()> {
        let store = self.store.as_mut().ok_or_else(|| {
            ReceiptError::Configuration(
                "adding categories requires a backing mapping file".to_string(),
            )
        })?;

        let entry = CategoryEntry::new(item, ItemCategory::new(category, sub_category));
        store.append(&entry)?;
        self.map.insert(entry);

        info!("Added category {} / {} for {}", category, sub_category, item);
        Ok(())
    }

    /// Categorize every line, then offer new unknown items to `resolver`.
    ///
    /// Resolution only happens with a backing store. A resolved item is
    /// persisted and every line naming it (case-insensitively) is updated;
    /// a skipped item stays uncategorized.
    pub fn categorize_table(
        &mut self,
        lines: Vec<ReceiptLine>,
        resolver: Option<&mut dyn CategoryResolver>,
    ) -> Result<Vec<CategorizedLine>> {
        let mut categorized: Vec<CategorizedLine> = lines
            .into_iter()
            .map(|line| {
                let category = self.categorize(&line.item);
                line.categorized(category)
            })
            .collect();

        let Some(resolver) = resolver else {
            return Ok(categorized);
        };
        if !self.has_store() {
            debug!("No backing mapping, skipping resolution of unknown items");
            return Ok(categorized);
        }

        let pending: Vec<String> = self.unknown_items[self.offered..].to_vec();
        self.offered = self.unknown_items.len();

        for item in pending {
            if self.map.contains(&item) {
                continue;
            }

            let Some(category) = resolver.resolve(&item) else {
                info!("Left {} uncategorized", item);
                continue;
            };
            if category.category.trim().is_empty() {
                info!("Left {} uncategorized", item);
                continue;
            }

            self.add_category(&item, &category.category, &category.sub_category)?;

            let lowered = item.to_lowercase();
            for line in categorized
                .iter_mut()
                .filter(|line| line.line.item.to_lowercase() == lowered)
            {
                line.category = category.clone();
            }
        }

        Ok(categorized)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::from_entries(Vec::new())
    }
}

fn keyword_category(key: &str) -> ItemCategory {
    KEYWORD_CATEGORIES
        .iter()
        .find(|(keyword, _, _)| key.contains(keyword))
        .map(|(_, category, sub)| ItemCategory::new(*category, *sub))
        .unwrap_or_else(ItemCategory::uncategorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::MemoryCategoryStore;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn entry(item: &str, category: &str, sub: &str) -> CategoryEntry {
        CategoryEntry::new(item, ItemCategory::new(category, sub))
    }

    fn line(item: &str) -> ReceiptLine {
        ReceiptLine::new("2024-03-24", "Walmart", item, "1", "1.00")
    }

    fn master_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("master_categories.csv");
        fs::write(&path, "Item,Category,Sub-Category\nGreat Value Milk,Grocery,Dairy\n").unwrap();
        path
    }

    fn row_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn test_exact_match_is_normalized() {
        let mut categorizer = Categorizer::from_entries([entry("Great Value Milk", "Grocery", "Dairy")]);
        assert_eq!(
            categorizer.categorize("great  value MILK"),
            ItemCategory::new("Grocery", "Dairy")
        );
    }

    #[test]
    fn test_last_duplicate_wins() {
        let map = CategoryMap::from_entries([
            entry("Eggs", "Grocery", "Dairy"),
            entry("EGGS", "Grocery", "Eggs"),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("eggs"), Some(&ItemCategory::new("Grocery", "Eggs")));
    }

    #[test]
    fn test_keyword_fallback() {
        let mut categorizer = Categorizer::default();
        assert_eq!(categorizer.strategy(), FallbackStrategy::Keywords);

        assert_eq!(categorizer.categorize("Fresh Bananas"), ItemCategory::new("Grocery", "Veggies"));
        assert_eq!(categorizer.categorize("Great Value Frozen Peas"), ItemCategory::new("Grocery", "Frozen"));
        assert_eq!(categorizer.categorize("Charmin Toilet Paper"), ItemCategory::new("Supplies", "Personal Care"));
        assert_eq!(categorizer.categorize("Tax"), ItemCategory::new("Tax", "Tax"));
        assert_eq!(categorizer.categorize("Lego Set"), ItemCategory::uncategorized());
        assert!(categorizer.unknown_items().is_empty());
    }

    #[test]
    fn test_keyword_order() {
        // "fresh" is tried before "chicken"
        let mut categorizer = Categorizer::default();
        assert_eq!(categorizer.categorize("Fresh Chicken Breast"), ItemCategory::new("Grocery", "Veggies"));
    }

    #[test]
    fn test_exact_match_beats_keywords() {
        let mut categorizer = Categorizer::from_entries([entry("Fresh Bananas", "Grocery", "Fruit")]);
        assert_eq!(categorizer.categorize("Fresh Bananas"), ItemCategory::new("Grocery", "Fruit"));
    }

    #[test]
    fn test_tracking_records_unknowns_once() {
        let mut categorizer = Categorizer::with_store(MemoryCategoryStore::default()).unwrap();
        assert_eq!(categorizer.strategy(), FallbackStrategy::TrackUnknown);

        assert_eq!(categorizer.categorize("Fresh Bananas"), ItemCategory::uncategorized());
        categorizer.categorize("Soap");
        categorizer.categorize("Fresh Bananas");
        categorizer.categorize("fresh bananas");

        assert_eq!(categorizer.unknown_items(), ["Fresh Bananas", "Soap", "fresh bananas"]);
    }

    #[test]
    fn test_categorize_is_idempotent() {
        let mut categorizer = Categorizer::with_store(MemoryCategoryStore::new(vec![entry(
            "Soap", "Supplies", "Personal Care",
        )]))
        .unwrap();

        for name in ["Soap", "Rope"] {
            let first = categorizer.categorize(name);
            let second = categorizer.categorize(name);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_add_category_requires_store() {
        let mut categorizer = Categorizer::default();
        let err = categorizer.add_category("Soap", "Supplies", "Personal Care").unwrap_err();
        assert!(matches!(err, ReceiptError::Configuration(_)));
    }

    #[test]
    fn test_add_category_persists_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = master_file(dir.path());
        let mut categorizer = Categorizer::open_master(&path).unwrap();

        assert_eq!(categorizer.categorize("Dish Soap"), ItemCategory::uncategorized());
        categorizer.add_category("Dish Soap", "Supplies", "Cleaning").unwrap();

        assert_eq!(categorizer.categorize("dish soap"), ItemCategory::new("Supplies", "Cleaning"));
        assert_eq!(row_count(&path), 3);

        // A fresh categorizer sees the appended row
        let mut reloaded = Categorizer::open_master(&path).unwrap();
        assert_eq!(reloaded.categorize("Dish Soap"), ItemCategory::new("Supplies", "Cleaning"));
    }

    #[test]
    fn test_add_category_appends_even_for_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = master_file(dir.path());
        let mut categorizer = Categorizer::open_master(&path).unwrap();

        categorizer.add_category("Great Value Milk", "Grocery", "Milk").unwrap();

        assert_eq!(row_count(&path), 3);
        assert_eq!(categorizer.categorize("Great Value Milk"), ItemCategory::new("Grocery", "Milk"));
    }

    #[test]
    fn test_from_csv_table_with_keyword_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.csv");
        fs::write(
            &path,
            "Item,Category,Sub-Category\nGreat Value Milk,Grocery,Dairy\nFresh Bananas,Grocery,Fruit\n",
        )
        .unwrap();

        let mut categorizer = Categorizer::from_csv(&path).unwrap();
        assert_eq!(categorizer.strategy(), FallbackStrategy::Keywords);
        assert!(!categorizer.has_store());
        assert_eq!(categorizer.map().len(), 2);

        // Table entry wins over the "fresh" keyword
        assert_eq!(categorizer.categorize("FRESH BANANAS"), ItemCategory::new("Grocery", "Fruit"));
        assert_eq!(categorizer.categorize("Frozen Peas"), ItemCategory::new("Grocery", "Frozen"));
        assert!(categorizer.categorize("Garden Hose").is_uncategorized());
        assert!(categorizer.unknown_items().is_empty());

        assert!(matches!(
            categorizer.add_category("Garden Hose", "Home", "Garden"),
            Err(ReceiptError::Configuration(_))
        ));
        assert_eq!(row_count(&path), 3);
    }

    #[test]
    fn test_from_csv_missing_file() {
        let err = Categorizer::from_csv(Path::new("/nonexistent/categories.csv")).err().unwrap();
        assert!(matches!(err, ReceiptError::MappingFileMissing(_)));
    }

    #[test]
    fn test_open_master_missing_file() {
        let err = Categorizer::open_master(Path::new("/nonexistent/master.csv")).err().unwrap();
        assert!(matches!(err, ReceiptError::MappingFileMissing(_)));
    }

    #[test]
    fn test_categorize_table_without_resolver() {
        let mut categorizer = Categorizer::with_store(MemoryCategoryStore::new(vec![entry(
            "Soap", "Supplies", "Personal Care",
        )]))
        .unwrap();

        let table = categorizer
            .categorize_table(vec![line("Soap"), line("Rope")], None)
            .unwrap();

        assert_eq!(table[0].category, ItemCategory::new("Supplies", "Personal Care"));
        assert!(table[1].category.is_uncategorized());
        assert_eq!(categorizer.unknown_items(), ["Rope"]);
    }

    #[test]
    fn test_categorize_table_resolves_and_updates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = master_file(dir.path());
        let mut categorizer = Categorizer::open_master(&path).unwrap();

        let mut asked = Vec::new();
        let mut resolver = |item: &str| {
            asked.push(item.to_string());
            Some(ItemCategory::new("Supplies", "Cleaning"))
        };

        let table = categorizer
            .categorize_table(
                vec![line("Dish Soap"), line("Great Value Milk"), line("DISH SOAP")],
                Some(&mut resolver),
            )
            .unwrap();

        assert_eq!(asked, vec!["Dish Soap"]);
        assert_eq!(table[0].category, ItemCategory::new("Supplies", "Cleaning"));
        assert_eq!(table[1].category, ItemCategory::new("Grocery", "Dairy"));
        assert_eq!(table[2].category, ItemCategory::new("Supplies", "Cleaning"));
        // "DISH SOAP" was mapped by the first answer and is not persisted twice
        assert_eq!(row_count(&path), 3);
    }

    #[test]
    fn test_skipped_item_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = master_file(dir.path());
        let mut categorizer = Categorizer::open_master(&path).unwrap();

        let mut skip = |_: &str| -> Option<ItemCategory> { None };
        let table = categorizer
            .categorize_table(vec![line("Mystery Item")], Some(&mut skip))
            .unwrap();

        assert!(table[0].category.is_uncategorized());
        assert_eq!(row_count(&path), 2);
    }

    #[test]
    fn test_empty_answer_is_a_skip() {
        let mut categorizer = Categorizer::with_store(MemoryCategoryStore::default()).unwrap();
        let mut blank = |_: &str| Some(ItemCategory::new("  ", ""));

        let table = categorizer
            .categorize_table(vec![line("Mystery Item")], Some(&mut blank))
            .unwrap();

        assert!(table[0].category.is_uncategorized());
        assert!(categorizer.map().is_empty());
    }

    #[test]
    fn test_items_are_offered_once() {
        let mut categorizer = Categorizer::with_store(MemoryCategoryStore::default()).unwrap();
        let mut count = 0;
        let mut skip = |_: &str| -> Option<ItemCategory> {
            count += 1;
            None
        };

        categorizer
            .categorize_table(vec![line("Mystery Item")], Some(&mut skip))
            .unwrap();
        categorizer
            .categorize_table(vec![line("Mystery Item"), line("Widget")], Some(&mut skip))
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_resolver_ignored_without_store() {
        let mut categorizer = Categorizer::default();
        let mut never = |_: &str| -> Option<ItemCategory> { panic!("resolver should not run") };

        let table = categorizer
            .categorize_table(vec![line("Lego Set")], Some(&mut never))
            .unwrap();

        assert!(table[0].category.is_uncategorized());
    }

    #[test]
    fn test_parse_then_categorize() {
        use crate::receipt::{ReceiptParser, WalmartReceiptParser};

        let text = "Mar 24, 2024\nGreat Value Milk Shopped Qty 2 $3.50\nFresh Bananas, each 1.25 lb $0.75\nTax 1 $0.42";
        let lines = WalmartReceiptParser::new().parse(text, None).lines;

        let mut categorizer = Categorizer::from_entries([entry("great value milk", "Grocery", "Dairy")]);
        let table = categorizer.categorize_table(lines, None).unwrap();

        let categories: Vec<_> = table.iter().map(|l| l.category.clone()).collect();
        assert_eq!(
            categories,
            vec![
                ItemCategory::new("Grocery", "Dairy"),
                ItemCategory::new("Grocery", "Veggies"),
                ItemCategory::new("Tax", "Tax"),
            ]
        );
        let prices: Vec<_> = table.iter().map(|l| l.line.price.as_str()).collect();
        assert_eq!(prices, vec!["3.50", "0.75", "0.42"]);
    }
}
