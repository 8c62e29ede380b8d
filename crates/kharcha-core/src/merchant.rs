//! Merchant label extraction from transaction descriptions

use std::sync::OnceLock;

use regex::Regex;

use crate::categories::title_case;

/// Label used when a description yields no usable tokens
pub const UNKNOWN_MERCHANT: &str = "Unknown";

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9\s]").expect("valid merchant regex"))
}

/// Derive a short merchant label: the first two alphanumeric tokens, title-cased
pub fn extract_merchant(description: &str) -> String {
    let cleaned = non_alphanumeric().replace_all(description, "");
    let tokens: Vec<String> = cleaned.split_whitespace().take(2).map(title_case).collect();

    if tokens.is_empty() {
        UNKNOWN_MERCHANT.to_string()
    } else {
        tokens.join(" ")
    }
}
