//! Statistical fallback categorization
//!
//! Rows that import as `Uncategorized` can be assigned a category by a small
//! text classifier trained on rows that do have one:
//!
//! - TF-IDF features over `"{description} {merchant}"` (smoothed idf, L2 rows)
//! - multinomial Naive Bayes with Laplace smoothing
//!
//! Training is deterministic and in-memory; nothing is persisted.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::models::{Transaction, UNCATEGORIZED};

/// Laplace smoothing for the Naive Bayes likelihoods
const ALPHA: f64 = 1.0;

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

/// Lower-cased tokens of two or more word characters
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Text the classifier sees for a transaction
pub fn training_text(tx: &Transaction) -> String {
    format!("{} {}", tx.description, tx.merchant)
}

/// TF-IDF vectorizer with a capped vocabulary
#[derive(Debug, Clone)]
struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    fn fit(documents: &[Vec<String>], max_features: usize) -> Self {
        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let mut seen = BTreeSet::new();
            for token in doc {
                *term_counts.entry(token).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        // Keep the most frequent terms; ties go to the alphabetically first
        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        Self { vocabulary, idf }
    }

    fn len(&self) -> usize {
        self.idf.len()
    }

    /// Sparse L2-normalized TF-IDF row, keyed by feature index
    fn transform(&self, tokens: &[String]) -> BTreeMap<usize, f64> {
        let mut row: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *row.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        for (idx, value) in row.iter_mut() {
            *value *= self.idf[*idx];
        }

        let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in row.values_mut() {
                *value /= norm;
            }
        }
        row
    }
}

/// Trained category classifier
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    vectorizer: TfidfVectorizer,
    /// Sorted class labels
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log likelihoods
    feature_log_prob: Vec<Vec<f64>>,
}

impl CategoryClassifier {
    /// Train on `(text, category)` pairs
    ///
    /// Returns `None` when there are fewer examples than
    /// `config.min_training_examples` or nothing to learn from.
    pub fn train(examples: &[(String, String)], config: &ClassifierConfig) -> Option<Self> {
        if examples.len() < config.min_training_examples.max(1) {
            debug!(
                examples = examples.len(),
                required = config.min_training_examples,
                "Not enough categorized rows to train classifier"
            );
            return None;
        }

        let documents: Vec<Vec<String>> = examples.iter().map(|(text, _)| tokenize(text)).collect();
        let vectorizer = TfidfVectorizer::fit(&documents, config.max_features);
        if vectorizer.len() == 0 {
            return None;
        }

        let classes: Vec<String> = examples
            .iter()
            .map(|(_, c)| c.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let class_index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let n_features = vectorizer.len();
        let mut class_counts = vec![0usize; classes.len()];
        let mut feature_counts = vec![vec![0.0f64; n_features]; classes.len()];

        for (doc, (_, category)) in documents.iter().zip(examples) {
            let ci = class_index[category.as_str()];
            class_counts[ci] += 1;
            for (fi, value) in vectorizer.transform(doc) {
                feature_counts[ci][fi] += value;
            }
        }

        let total = examples.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_counts
            .iter()
            .map(|counts| {
                let denom = counts.iter().sum::<f64>() + ALPHA * n_features as f64;
                counts.iter().map(|c| ((c + ALPHA) / denom).ln()).collect()
            })
            .collect();

        debug!(
            examples = examples.len(),
            classes = classes.len(),
            features = n_features,
            "Trained category classifier"
        );

        Some(Self {
            vectorizer,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Train on transactions that already carry a real category
    pub fn from_transactions<'a, I>(transactions: I, config: &ClassifierConfig) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let examples: Vec<(String, String)> = transactions
            .into_iter()
            .filter(|t| t.category != UNCATEGORIZED)
            .map(|t| (training_text(t), t.category.clone()))
            .collect();
        Self::train(&examples, config)
    }

    /// Most probable category for a piece of text
    ///
    /// Text with no known terms falls back to the most common class. Ties go to
    /// the alphabetically first category.
    pub fn predict(&self, text: &str) -> &str {
        let row = self.vectorizer.transform(&tokenize(text));

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (ci, prior) in self.class_log_prior.iter().enumerate() {
            let score = prior
                + row
                    .iter()
                    .map(|(fi, value)| value * self.feature_log_prob[ci][*fi])
                    .sum::<f64>();
            if score > best_score {
                best = ci;
                best_score = score;
            }
        }
        &self.classes[best]
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Assign categories to `Uncategorized` transactions in place
///
/// Returns how many rows were changed.
pub fn classify_uncategorized(
    transactions: &mut [Transaction],
    classifier: &CategoryClassifier,
) -> usize {
    let mut changed = 0;
    for tx in transactions
        .iter_mut()
        .filter(|t| t.category == UNCATEGORIZED)
    {
        let predicted = classifier.predict(&training_text(tx));
        if predicted != UNCATEGORIZED {
            tx.category = predicted.to_string();
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn examples() -> Vec<(String, String)> {
        let rows = [
            ("swiggy order dinner", "Food"),
            ("zomato lunch order", "Food"),
            ("dominos pizza order", "Food"),
            ("cafe coffee day", "Food"),
            ("uber trip airport", "Transport"),
            ("ola cab ride", "Transport"),
            ("metro card recharge", "Transport"),
            ("uber trip office", "Transport"),
            ("amazon order electronics", "Shopping"),
            ("flipkart order shoes", "Shopping"),
            ("myntra shirt", "Shopping"),
        ];
        rows.iter()
            .map(|(t, c)| (t.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("UPI/Swiggy-Order a 42"),
            vec!["upi", "swiggy", "order", "42"]
        );
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_requires_minimum_examples() {
        let config = ClassifierConfig::default();
        let few = &examples()[..5];
        assert!(CategoryClassifier::train(few, &config).is_none());
        assert!(CategoryClassifier::train(&examples(), &config).is_some());
    }

    #[test]
    fn test_predict() {
        let classifier = CategoryClassifier::train(&examples(), &ClassifierConfig::default()).unwrap();
        assert_eq!(classifier.classes(), &["Food", "Shopping", "Transport"]);
        assert_eq!(classifier.predict("swiggy dinner"), "Food");
        assert_eq!(classifier.predict("uber trip home"), "Transport");
        assert_eq!(classifier.predict("flipkart electronics"), "Shopping");
    }

    #[test]
    fn test_unknown_text_uses_prior() {
        let classifier = CategoryClassifier::train(&examples(), &ClassifierConfig::default()).unwrap();
        // Food and Transport each have four examples; Food sorts first
        assert_eq!(classifier.predict("zzz qqq"), "Food");
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let config = ClassifierConfig {
            max_features: 3,
            ..Default::default()
        };
        let classifier = CategoryClassifier::train(&examples(), &config).unwrap();
        assert_eq!(classifier.vectorizer.len(), 3);
        // "order" is the most frequent term
        assert!(classifier.vectorizer.vocabulary.contains_key("order"));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let docs: Vec<Vec<String>> = examples().iter().map(|(t, _)| tokenize(t)).collect();
        let vectorizer = TfidfVectorizer::fit(&docs, 1000);
        let row = vectorizer.transform(&tokenize("uber trip order"));
        let norm: f64 = row.values().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(vectorizer.transform(&tokenize("nothing known")).is_empty());
    }

    #[test]
    fn test_classify_uncategorized() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mk = |description: &str, category: &str| Transaction {
            date,
            description: description.to_string(),
            merchant: crate::merchant::extract_merchant(description),
            amount: -10.0,
            category: category.to_string(),
        };

        let mut training: Vec<Transaction> = examples()
            .iter()
            .map(|(t, c)| mk(t, c))
            .collect();
        training.push(mk("mystery row", UNCATEGORIZED));

        let classifier =
            CategoryClassifier::from_transactions(&training, &ClassifierConfig::default()).unwrap();
        assert!(!classifier.classes().iter().any(|c| c == UNCATEGORIZED));

        let mut incoming = vec![mk("ola cab to station", UNCATEGORIZED), mk("zomato", "Food")];
        let changed = classify_uncategorized(&mut incoming, &classifier);
        assert_eq!(changed, 1);
        assert_eq!(incoming[0].category, "Transport");
        assert_eq!(incoming[1].category, "Food");
    }
}
