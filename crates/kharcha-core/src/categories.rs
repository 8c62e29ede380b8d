//! Category normalization and extraction
//!
//! A fixed alias table maps free text to one of nine canonical categories.
//! The same table is used two ways:
//! - normalization of the category column during import
//! - extraction of a category mentioned in a chat question
//!
//! Categories are tested in declaration order and the first match wins, so a
//! string that hits aliases of several categories resolves to the earliest one.

use crate::models::UNCATEGORIZED;

/// Canonical categories with their trigger substrings, in priority order
pub const CATEGORY_ALIASES: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "food",
            "dining",
            "groceries",
            "restaurant",
            "cafe",
            "meal",
            "grocery",
            "snacks",
            "dinner",
            "lunch",
            "breakfast",
            "ccd",
        ],
    ),
    (
        "transport",
        &[
            "transport",
            "transportation",
            "uber",
            "ola",
            "cab",
            "taxi",
            "fuel",
            "bus",
            "train",
            "metro",
            "petrol",
            "ride",
        ],
    ),
    (
        "shopping",
        &[
            "shopping",
            "amazon",
            "flipkart",
            "myntra",
            "mall",
            "store",
            "clothing",
            "electronics",
            "purchase",
            "online",
        ],
    ),
    (
        "bills",
        &[
            "bills",
            "utilities",
            "electricity",
            "wifi",
            "phone",
            "internet",
            "rent",
            "water",
            "mobile",
            "recharge",
            "bill",
            "gas",
        ],
    ),
    (
        "health",
        &[
            "health",
            "doctor",
            "hospital",
            "pharmacy",
            "medicine",
            "healthcare",
            "gym",
            "dental",
        ],
    ),
    (
        "entertainment",
        &[
            "entertainment",
            "movies",
            "cinema",
            "netflix",
            "game",
            "concert",
            "pvr",
            "ticket",
            "subscription",
            "movie",
            "bowling",
        ],
    ),
    (
        "education",
        &[
            "education",
            "school",
            "college",
            "tuition",
            "course",
            "udemy",
            "book",
            "certification",
        ],
    ),
    (
        "investment",
        &["investment", "stocks", "mutual fund", "dividend", "sip"],
    ),
    (
        "income",
        &["salary", "income", "freelance", "bonus", "deposit", "payment"],
    ),
];

/// Synonyms checked only when the alias table finds nothing in a question
const QUESTION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Food",
        &["food", "restaurant", "grocery", "dinner", "lunch", "snack"],
    ),
    ("Entertainment", &["movie", "netflix", "concert", "entertain"]),
    ("Shopping", &["shopping", "amazon", "mall", "store"]),
    ("Transport", &["transport", "petrol", "metro", "uber"]),
    ("Bills", &["bill", "electricity", "water", "mobile"]),
];

/// Canonical category labels in priority order (title-cased)
pub fn canonical_categories() -> Vec<String> {
    CATEGORY_ALIASES
        .iter()
        .map(|(key, _)| title_case(key))
        .collect()
}

/// Upper-case the first character and lower-case the rest
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Find the first canonical key whose name or alias appears in `text`
///
/// `exact_key` controls whether the key itself must equal the whole text
/// (normalization) or may appear anywhere in it (question extraction).
fn match_alias(text: &str, exact_key: bool) -> Option<&'static str> {
    CATEGORY_ALIASES
        .iter()
        .find(|(key, aliases)| {
            let key_hit = if exact_key {
                text == *key
            } else {
                text.contains(key)
            };
            key_hit || aliases.iter().any(|alias| text.contains(alias))
        })
        .map(|(key, _)| *key)
}

/// Map a raw category string to a canonical category
///
/// Unknown categories pass through title-cased; empty input becomes
/// `Uncategorized`.
pub fn normalize_category(text: &str) -> String {
    let trimmed = text.trim().to_lowercase();
    if trimmed.is_empty() {
        return UNCATEGORIZED.to_string();
    }

    match match_alias(&trimmed, true) {
        Some(key) => title_case(key),
        None => title_case(&trimmed),
    }
}

/// Find the category a question is asking about, if any
pub fn extract_category(question: &str) -> Option<String> {
    let q = question.to_lowercase();

    if let Some(key) = match_alias(&q, false) {
        return Some(title_case(key));
    }

    QUESTION_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| q.contains(w)))
        .map(|(category, _)| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("food"), "Food");
        assert_eq!(title_case("FOOD"), "Food");
        assert_eq!(title_case("pet care"), "Pet care");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_category(""), "Uncategorized");
        assert_eq!(normalize_category("   "), "Uncategorized");
    }

    #[test]
    fn test_normalize_exact_key() {
        assert_eq!(normalize_category("food"), "Food");
        assert_eq!(normalize_category("  Transport "), "Transport");
        assert_eq!(normalize_category("INCOME"), "Income");
    }

    #[test]
    fn test_normalize_alias_substring() {
        assert_eq!(normalize_category("Groceries"), "Food");
        assert_eq!(normalize_category("Uber ride"), "Transport");
        assert_eq!(normalize_category("Electricity Bill"), "Bills");
        assert_eq!(normalize_category("Mutual Fund SIP"), "Investment");
        assert_eq!(normalize_category("Monthly salary"), "Income");
    }

    #[test]
    fn test_normalize_earlier_category_wins() {
        // "online" is a shopping alias, "bill" a bills alias; shopping is declared first
        assert_eq!(normalize_category("online bill"), "Shopping");
        // "movie ticket at the food court" hits food before entertainment
        assert_eq!(normalize_category("movie ticket at the food court"), "Food");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_category("PETS"), "Pets");
        assert_eq!(normalize_category("  travel  "), "Travel");
    }

    #[test]
    fn test_normalize_uncategorized_is_stable() {
        assert_eq!(normalize_category("Uncategorized"), "Uncategorized");
    }

    #[test]
    fn test_normalize_idempotent_for_canonical() {
        for category in canonical_categories() {
            let once = normalize_category(&category);
            assert_eq!(once, category);
            assert_eq!(normalize_category(&once), once);
        }
    }

    #[test]
    fn test_normalize_never_empty() {
        for input in ["", " ", "x", "???", "food", "Pets & Vet"] {
            assert!(!normalize_category(input).is_empty());
        }
    }

    #[test]
    fn test_extract_category_alias_pass() {
        assert_eq!(
            extract_category("how much did i spend on food"),
            Some("Food".to_string())
        );
        assert_eq!(
            extract_category("Uber trips last week"),
            Some("Transport".to_string())
        );
        assert_eq!(
            extract_category("what did netflix cost"),
            Some("Entertainment".to_string())
        );
    }

    #[test]
    fn test_extract_category_keyword_pass() {
        // "snack" (singular) and "entertain" are only in the second pass
        assert_eq!(extract_category("any snack today"), Some("Food".to_string()));
        assert_eq!(
            extract_category("how do i entertain myself"),
            Some("Entertainment".to_string())
        );
    }

    #[test]
    fn test_extract_category_none() {
        assert_eq!(extract_category("how much did i spend"), None);
        assert_eq!(extract_category(""), None);
    }

    #[test]
    fn test_canonical_categories_order() {
        let categories = canonical_categories();
        assert_eq!(categories.len(), 9);
        assert_eq!(categories[0], "Food");
        assert_eq!(categories[8], "Income");
    }
}
