//! Human-facing views of scores and profiles.

use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;
use crate::models::{KeywordEntry, Origin};

/// Keywords at or above this weight are marked as hot in summaries.
pub const HOT_WEIGHT: f64 = 2.0;
/// Negatives listed in a summary.
pub const SUMMARY_NEGATIVES: usize = 5;
const EXPLAIN_LIMIT: usize = 3;

/// One-line reason a job was recommended.
pub fn explain(matched: &[String]) -> String {
    if matched.is_empty() {
        return "New opportunity in your field".to_string();
    }
    let shown: Vec<&str> = matched.iter().take(EXPLAIN_LIMIT).map(String::as_str).collect();
    let mut text = format!("Matches your interests: {}", shown.join(", "));
    if matched.len() > EXPLAIN_LIMIT {
        text.push_str(&format!(" (+{} more)", matched.len() - EXPLAIN_LIMIT));
    }
    text
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordView {
    pub keyword: String,
    pub weight: f64,
    pub origin: Origin,
    pub hard: bool,
    pub hot: bool,
    pub rationale: Option<String>,
}

impl From<&KeywordEntry> for KeywordView {
    fn from(entry: &KeywordEntry) -> Self {
        Self {
            keyword: entry.text.clone(),
            weight: entry.weight,
            origin: entry.origin,
            hard: entry.hard,
            hot: entry.is_positive() && entry.weight > HOT_WEIGHT,
            rationale: entry.rationale.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub positive: Vec<KeywordView>,
    pub negative: Vec<KeywordView>,
}

/// Strongest positives (up to `top_k`) and negatives, heaviest first.
pub fn summarize(keywords: &[KeywordEntry], config: &LearningConfig) -> KeywordSummary {
    let mut positive: Vec<&KeywordEntry> = keywords.iter().filter(|k| k.is_positive()).collect();
    positive.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.text.cmp(&b.text)));

    let mut negative: Vec<&KeywordEntry> = keywords.iter().filter(|k| k.is_negative()).collect();
    negative.sort_by(|a, b| {
        b.magnitude()
            .total_cmp(&a.magnitude())
            .then_with(|| a.text.cmp(&b.text))
    });

    KeywordSummary {
        positive: positive.into_iter().take(config.top_k).map(KeywordView::from).collect(),
        negative: negative
            .into_iter()
            .take(SUMMARY_NEGATIVES)
            .map(KeywordView::from)
            .collect(),
    }
}
