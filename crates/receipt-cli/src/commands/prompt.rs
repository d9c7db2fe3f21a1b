//! Interactive category prompts for unmatched items.
//!
//! Uses `dialoguer`; an empty category skips the item.

use console::style;
use dialoguer::Input;
use tracing::warn;

use receipt_core::ItemCategory;

/// Ask for the category of `item`. Blocks until answered.
pub fn prompt_category(item: &str) -> Option<ItemCategory> {
    // stderr, next to dialoguer's own prompts, so stdout output stays clean
    eprintln!();
    eprintln!("{} Unknown item: {}", style("?").yellow(), style(item).bold());

    let category: String = match Input::new()
        .with_prompt("Category (empty to skip)")
        .allow_empty(true)
        .interact_text()
    {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not read category for {}: {}", item, e);
            return None;
        }
    };

    let category = category.trim().to_string();
    if category.is_empty() {
        return None;
    }

    let sub_category: String = Input::new()
        .with_prompt("Sub-category")
        .default(category.clone())
        .interact_text()
        .unwrap_or_else(|e| {
            warn!("Could not read sub-category for {}: {}", item, e);
            category.clone()
        });

    Some(ItemCategory::new(category, sub_category.trim()))
}
