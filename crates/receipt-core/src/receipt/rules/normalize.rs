//! Text and price normalization.

/// Collapse runs of whitespace to single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Give a price without an integer part a leading zero (`.99` -> `0.99`).
pub fn normalize_price(price: &str) -> String {
    let price = price.trim();
    if price.starts_with('.') {
        format!("0{}", price)
    } else {
        price.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Great  Value\tMilk \n"), "Great Value Milk");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price(".99"), "0.99");
        assert_eq!(normalize_price(" .05"), "0.05");
        assert_eq!(normalize_price("3.50"), "3.50");
        assert_eq!(normalize_price("0.75"), "0.75");
    }
}
