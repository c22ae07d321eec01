//! Keyword Merge Resolver: folds externally suggested keywords into a profile.
//!
//! Pure reconciliation: insert new keywords, adjust existing ones, resolve
//! conflicting polarity. Decay is not applied here; the profile updater
//! applies it once per update cycle.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;
use crate::matching::tokenizer::normalize_keyword;
use crate::models::{Feedback, KeywordEntry, Polarity};

/// Longest keyword phrase accepted from a suggestion, in tokens.
pub const MAX_KEYWORD_TOKENS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Strong,
    Neutral,
}

/// A (keyword, sentiment, rationale) triple from the suggestion source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub keyword: String,
    pub sentiment: Polarity,
    #[serde(default)]
    pub rationale: Option<String>,
    /// When absent, a suggestion agreeing with the feedback counts as strong.
    #[serde(default)]
    pub confidence: Option<Confidence>,
}

impl KeywordSuggestion {
    pub fn new(keyword: impl Into<String>, sentiment: Polarity) -> Self {
        Self {
            keyword: keyword.into(),
            sentiment,
            rationale: None,
            confidence: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    fn agrees_with(&self, feedback: Feedback) -> bool {
        matches!(
            (feedback, self.sentiment),
            (Feedback::Like, Polarity::Positive) | (Feedback::Dislike, Polarity::Negative)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub inserted_positive: usize,
    pub inserted_negative: usize,
    /// Existing entries whose polarity agreed with the suggestion.
    pub reinforced: usize,
    /// Conflicting entries that kept their polarity.
    pub conflicted: usize,
    /// Conflicting entries flipped to negative.
    pub flipped: usize,
    pub skipped_cap: usize,
    pub skipped_invalid: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub keywords: Vec<KeywordEntry>,
    pub report: MergeReport,
}

/// Weight delta implied by a suggestion: signed by its sentiment, halved when
/// it disagrees with the feedback.
fn suggestion_delta(suggestion: &KeywordSuggestion, feedback: Feedback, config: &LearningConfig) -> f64 {
    let base = match feedback {
        Feedback::Like => config.like_boost,
        Feedback::Dislike => config.dislike_penalty.abs(),
    };
    let scale = if suggestion.agrees_with(feedback) { 1.0 } else { 0.5 };
    suggestion.sentiment.direction() * base * scale
}

fn seed_weight(suggestion: &KeywordSuggestion, feedback: Feedback, config: &LearningConfig) -> f64 {
    let confidence = suggestion.confidence.unwrap_or(if suggestion.agrees_with(feedback) {
        Confidence::Strong
    } else {
        Confidence::Neutral
    });
    let magnitude = match confidence {
        Confidence::Strong => config.strong_seed,
        Confidence::Neutral => config.neutral_seed,
    };
    suggestion.sentiment.direction() * magnitude
}

/// Reconciles `suggestions` with `keywords` for one feedback event.
///
/// - Unknown keyword: inserted as `auto` with a seed weight, subject to the
///   per-feedback caps on new positive and negative entries.
/// - Known keyword, same polarity: weight moves by the suggestion delta.
/// - Known keyword, conflicting polarity: delta applied; flipped to negative
///   only when the suggestion is negative and the new weight falls below
///   `negative_promote_at`.
/// - Manual entries only ever have their weight adjusted.
pub fn merge_suggestions(
    mut keywords: Vec<KeywordEntry>,
    suggestions: &[KeywordSuggestion],
    feedback: Feedback,
    config: &LearningConfig,
) -> MergeOutcome {
    let mut report = MergeReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for suggestion in suggestions {
        let text = normalize_keyword(&suggestion.keyword);
        let token_count = text.split_whitespace().count();
        if text.is_empty() || token_count > MAX_KEYWORD_TOKENS {
            report.skipped_invalid += 1;
            continue;
        }
        if !seen.insert(text.clone()) {
            report.duplicates += 1;
            continue;
        }
        let rationale = suggestion
            .rationale
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if let Some(entry) = keywords.iter_mut().find(|k| k.text == text) {
            let delta = suggestion_delta(suggestion, feedback, config);
            entry.weight += delta;

            if entry.polarity == suggestion.sentiment {
                report.reinforced += 1;
            } else if !entry.is_manual()
                && suggestion.sentiment == Polarity::Negative
                && entry.weight < config.negative_promote_at
            {
                entry.polarity = Polarity::Negative;
                report.flipped += 1;
            } else {
                report.conflicted += 1;
            }

            if !entry.is_manual() && rationale.is_some() {
                entry.rationale = rationale;
            }
            continue;
        }

        let (inserted, cap) = match suggestion.sentiment {
            Polarity::Positive => (&mut report.inserted_positive, config.max_new_positive),
            Polarity::Negative => (&mut report.inserted_negative, config.max_new_negative),
        };
        if *inserted >= cap {
            report.skipped_cap += 1;
            continue;
        }
        *inserted += 1;

        let mut entry = KeywordEntry::auto(
            text,
            seed_weight(suggestion, feedback, config),
            suggestion.sentiment,
        );
        entry.rationale = rationale;
        keywords.push(entry);
    }

    MergeOutcome { keywords, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LearningConfig {
        LearningConfig::default()
    }

    #[test]
    fn test_new_aligned_suggestion_seeded_strong() {
        let outcome = merge_suggestions(
            vec![],
            &[KeywordSuggestion::new("Python", Polarity::Positive).with_rationale("core skill")],
            Feedback::Like,
            &config(),
        );
        let entry = &outcome.keywords[0];
        assert_eq!(entry.text, "python");
        assert_eq!(entry.weight, 1.0);
        assert_eq!(entry.origin, crate::models::Origin::Auto);
        assert_eq!(entry.rationale.as_deref(), Some("core skill"));
        assert_eq!(outcome.report.inserted_positive, 1);
    }

    #[test]
    fn test_new_disagreeing_suggestion_seeded_neutral() {
        let outcome = merge_suggestions(
            vec![],
            &[KeywordSuggestion::new("cold calling", Polarity::Negative)],
            Feedback::Like,
            &config(),
        );
        assert_eq!(outcome.keywords[0].weight, -0.5);
        assert_eq!(outcome.keywords[0].polarity, Polarity::Negative);
    }

    #[test]
    fn test_explicit_confidence_overrides_alignment() {
        let mut suggestion = KeywordSuggestion::new("remote", Polarity::Positive);
        suggestion.confidence = Some(Confidence::Neutral);
        let outcome = merge_suggestions(vec![], &[suggestion], Feedback::Like, &config());
        assert_eq!(outcome.keywords[0].weight, 0.5);
    }

    #[test]
    fn test_insert_caps_per_feedback() {
        let suggestions: Vec<KeywordSuggestion> = ["a1", "b2", "c3", "d4", "e5"]
            .iter()
            .map(|k| KeywordSuggestion::new(*k, Polarity::Positive))
            .chain(
                ["n1", "n2", "n3"]
                    .iter()
                    .map(|k| KeywordSuggestion::new(*k, Polarity::Negative)),
            )
            .collect();
        let outcome = merge_suggestions(vec![], &suggestions, Feedback::Like, &config());
        assert_eq!(outcome.report.inserted_positive, 3);
        assert_eq!(outcome.report.inserted_negative, 2);
        assert_eq!(outcome.report.skipped_cap, 3);
        assert_eq!(outcome.keywords.len(), 5);
    }

    #[test]
    fn test_existing_same_polarity_reinforced() {
        let existing = vec![KeywordEntry::auto("rust", 1.0, Polarity::Positive)];
        let outcome = merge_suggestions(
            existing,
            &[KeywordSuggestion::new("rust", Polarity::Positive)],
            Feedback::Like,
            &config(),
        );
        assert_eq!(outcome.keywords[0].weight, 2.0);
        assert_eq!(outcome.report.reinforced, 1);
    }

    #[test]
    fn test_dislike_reinforces_negative_magnitude() {
        let existing = vec![KeywordEntry::auto("sales", -1.0, Polarity::Negative)];
        let outcome = merge_suggestions(
            existing,
            &[KeywordSuggestion::new("sales", Polarity::Negative)],
            Feedback::Dislike,
            &config(),
        );
        assert_eq!(outcome.keywords[0].weight, -2.0);
    }

    #[test]
    fn test_conflict_flips_when_below_promote_threshold() {
        let existing = vec![KeywordEntry::auto("java", -1.8, Polarity::Positive)];
        let outcome = merge_suggestions(
            existing,
            &[KeywordSuggestion::new("java", Polarity::Negative)],
            Feedback::Dislike,
            &config(),
        );
        assert_eq!(outcome.keywords[0].polarity, Polarity::Negative);
        assert!((outcome.keywords[0].weight - -2.8).abs() < 1e-9);
        assert_eq!(outcome.report.flipped, 1);
    }

    #[test]
    fn test_conflict_retains_polarity_above_threshold() {
        let existing = vec![KeywordEntry::auto("java", 1.0, Polarity::Positive)];
        let outcome = merge_suggestions(
            existing,
            &[KeywordSuggestion::new("java", Polarity::Negative)],
            Feedback::Dislike,
            &config(),
        );
        assert_eq!(outcome.keywords[0].polarity, Polarity::Positive);
        assert_eq!(outcome.keywords[0].weight, 0.0);
        assert_eq!(outcome.report.conflicted, 1);
    }

    #[test]
    fn test_manual_entry_never_flipped_or_relabelled() {
        let existing =
            vec![KeywordEntry::manual("java", -1.8, Polarity::Positive).with_rationale("mine")];
        let outcome = merge_suggestions(
            existing,
            &[KeywordSuggestion::new("java", Polarity::Negative).with_rationale("llm says no")],
            Feedback::Dislike,
            &config(),
        );
        let entry = &outcome.keywords[0];
        assert_eq!(entry.polarity, Polarity::Positive);
        assert!(entry.is_manual());
        assert_eq!(entry.rationale.as_deref(), Some("mine"));
        assert!((entry.weight - -2.8).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_and_duplicate_suggestions_skipped() {
        let suggestions = vec![
            KeywordSuggestion::new("  !! ", Polarity::Positive),
            KeywordSuggestion::new("one two three four five", Polarity::Positive),
            KeywordSuggestion::new("Go", Polarity::Positive),
            KeywordSuggestion::new("go", Polarity::Positive),
        ];
        let outcome = merge_suggestions(vec![], &suggestions, Feedback::Like, &config());
        assert_eq!(outcome.report.skipped_invalid, 2);
        assert_eq!(outcome.report.duplicates, 1);
        assert_eq!(outcome.keywords.len(), 1);
    }

    #[test]
    fn test_suggestion_deserializes_without_optional_fields() {
        let suggestion: KeywordSuggestion =
            serde_json::from_str(r#"{"keyword": "rust", "sentiment": "positive"}"#).unwrap();
        assert_eq!(suggestion.sentiment, Polarity::Positive);
        assert!(suggestion.rationale.is_none());
    }
}
