//! Rule-based intent classification for chat questions
//!
//! Rules share trigger words, so their order is the disambiguation mechanism:
//! the first matching rule wins.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::categories::extract_category;

/// Number of results returned by "top expenses" when the question names none
pub const DEFAULT_TOP_N: usize = 3;

/// The analytical operation a question maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SumByCategory,
    FastestGrowingCategory,
    TopExpenses,
    ListTransactions,
    SpendingAlerts,
    Fallback,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SumByCategory => "sum_by_category",
            Self::FastestGrowingCategory => "fastest_growing_category",
            Self::TopExpenses => "top_expenses",
            Self::ListTransactions => "list_transactions",
            Self::SpendingAlerts => "spending_alerts",
            Self::Fallback => "fallback",
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum_by_category" => Ok(Self::SumByCategory),
            "fastest_growing_category" => Ok(Self::FastestGrowingCategory),
            "top_expenses" => Ok(Self::TopExpenses),
            "list_transactions" => Ok(Self::ListTransactions),
            "spending_alerts" => Ok(Self::SpendingAlerts),
            "fallback" => Ok(Self::Fallback),
            _ => Err(format!("Unknown intent: {}", s)),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const SUM_WORDS: &[&str] = &["how much", "spent", "spend", "expense", "total", "amount"];
const GROWTH_WORDS: &[&str] = &["growing", "trend", "increase"];
const RANK_WORDS: &[&str] = &["biggest", "top", "highest", "largest"];
const RANK_TARGETS: &[&str] = &["expense", "spend", "purchase"];
const LIST_WORDS: &[&str] = &["list", "show", "what are", "which"];
const ALERT_WORDS: &[&str] = &["alert", "overspend", "budget", "limit"];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Classify a question into an intent
pub fn classify_intent(question: &str) -> Intent {
    let q = question.to_lowercase();

    if contains_any(&q, SUM_WORDS) && extract_category(&q).is_some() {
        Intent::SumByCategory
    } else if contains_any(&q, GROWTH_WORDS) {
        Intent::FastestGrowingCategory
    } else if contains_any(&q, RANK_WORDS) && contains_any(&q, RANK_TARGETS) {
        Intent::TopExpenses
    } else if contains_any(&q, LIST_WORDS) {
        Intent::ListTransactions
    } else if contains_any(&q, ALERT_WORDS) {
        Intent::SpendingAlerts
    } else {
        Intent::Fallback
    }
}

fn top_n_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(top|biggest|highest)\s*(\d+)").expect("valid top-n regex"))
}

/// Extract N from phrases like "top 5" or "biggest 10"
pub fn parse_top_n(question: &str, default: usize) -> usize {
    top_n_pattern()
        .captures(&question.to_lowercase())
        .and_then(|caps| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_by_category_requires_category() {
        assert_eq!(
            classify_intent("how much did I spend on food"),
            Intent::SumByCategory
        );
        assert_eq!(classify_intent("how much did I spend"), Intent::Fallback);
    }

    #[test]
    fn test_growth_intent() {
        assert_eq!(
            classify_intent("which category is growing fastest"),
            Intent::FastestGrowingCategory
        );
        assert_eq!(
            classify_intent("show me the trend"),
            Intent::FastestGrowingCategory
        );
    }

    #[test]
    fn test_top_expenses() {
        assert_eq!(
            classify_intent("show my top 5 expenses"),
            Intent::TopExpenses
        );
        assert_eq!(
            classify_intent("what was my largest purchase"),
            Intent::TopExpenses
        );
        // "top" alone is not enough
        assert_eq!(classify_intent("top of the list"), Intent::ListTransactions);
    }

    #[test]
    fn test_top_expenses_with_category_is_sum() {
        // "expense" + a category satisfies the first rule
        assert_eq!(
            classify_intent("biggest food expenses"),
            Intent::SumByCategory
        );
    }

    #[test]
    fn test_list_transactions() {
        assert_eq!(
            classify_intent("list my transactions"),
            Intent::ListTransactions
        );
        assert_eq!(
            classify_intent("what are my recent payments"),
            Intent::ListTransactions
        );
    }

    #[test]
    fn test_alerts() {
        assert_eq!(
            classify_intent("am I over budget?"),
            Intent::SpendingAlerts
        );
        assert_eq!(classify_intent("any alerts"), Intent::SpendingAlerts);
    }

    #[test]
    fn test_list_beats_alerts() {
        assert_eq!(
            classify_intent("show budget alerts"),
            Intent::ListTransactions
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(classify_intent("hello there"), Intent::Fallback);
        assert_eq!(classify_intent(""), Intent::Fallback);
    }

    #[test]
    fn test_parse_top_n() {
        assert_eq!(parse_top_n("show my top 5 expenses", DEFAULT_TOP_N), 5);
        assert_eq!(parse_top_n("show my biggest expenses", DEFAULT_TOP_N), 3);
        assert_eq!(parse_top_n("Highest10 purchases", DEFAULT_TOP_N), 10);
        assert_eq!(
            parse_top_n("top 99999999999999999999999 expenses", DEFAULT_TOP_N),
            3
        );
    }

    #[test]
    fn test_intent_round_trip_names() {
        assert_eq!(
            "top_expenses".parse::<Intent>().unwrap(),
            Intent::TopExpenses
        );
        assert_eq!(Intent::SpendingAlerts.to_string(), "spending_alerts");
        assert!("nonsense".parse::<Intent>().is_err());
    }
}
