//! Keyword suggestion source: pluggable, trait-based.
//!
//! Default: `LlmKeywordSuggester` (Claude via `llm_client`).
//! `DisabledSuggester` is used when no API key is configured.
//! Any failure degrades to zero suggestions; profile updates then proceed with
//! existing-keyword deltas only.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::matching::merge::KeywordSuggestion;
use crate::models::{Feedback, JobRecord, KeywordEntry};

pub mod prompts;

use prompts::{suggestion_system, SUGGESTION_PROMPT_TEMPLATE};

/// Characters of description sent to the model.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 500;
/// Suggestions beyond this many are ignored.
pub const MAX_SUGGESTIONS: usize = 10;
/// Current keywords listed in the prompt.
const PROMPT_KEYWORDS: usize = 8;

pub struct SuggestionRequest<'a> {
    pub job: &'a JobRecord,
    pub keywords: &'a [KeywordEntry],
    pub feedback: Feedback,
}

#[async_trait]
pub trait KeywordSuggester: Send + Sync {
    async fn suggest(
        &self,
        request: &SuggestionRequest<'_>,
    ) -> Result<Vec<KeywordSuggestion>, LlmError>;
}

/// Never suggests anything.
pub struct DisabledSuggester;

#[async_trait]
impl KeywordSuggester for DisabledSuggester {
    async fn suggest(
        &self,
        _request: &SuggestionRequest<'_>,
    ) -> Result<Vec<KeywordSuggestion>, LlmError> {
        Ok(vec![])
    }
}

pub struct LlmKeywordSuggester(pub LlmClient);

#[async_trait]
impl KeywordSuggester for LlmKeywordSuggester {
    async fn suggest(
        &self,
        request: &SuggestionRequest<'_>,
    ) -> Result<Vec<KeywordSuggestion>, LlmError> {
        let prompt = build_prompt(request);
        let raw: Vec<Value> = self.0.call_json(&prompt, &suggestion_system()).await?;
        let (suggestions, dropped) = validate_suggestions(raw);
        if dropped > 0 {
            debug!("Dropped {dropped} malformed keyword suggestions");
        }
        Ok(suggestions)
    }
}

/// Asks the suggester, swallowing failures into an empty list.
pub async fn suggest_or_empty(
    suggester: &dyn KeywordSuggester,
    request: &SuggestionRequest<'_>,
) -> Vec<KeywordSuggestion> {
    match suggester.suggest(request).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!(
                "Keyword suggestion failed for job {}: {e}; continuing without suggestions",
                request.job.job_id
            );
            vec![]
        }
    }
}

pub fn build_prompt(request: &SuggestionRequest<'_>) -> String {
    let reaction = match request.feedback {
        Feedback::Like => "like",
        Feedback::Dislike => "dislike",
    };
    let keywords = if request.keywords.is_empty() {
        "None yet".to_string()
    } else {
        request
            .keywords
            .iter()
            .take(PROMPT_KEYWORDS)
            .map(|k| format!("{} (weight: {:.2}, {})", k.text, k.weight, k.polarity))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let description: String = request
        .job
        .description
        .chars()
        .take(DESCRIPTION_PREVIEW_CHARS)
        .collect();

    SUGGESTION_PROMPT_TEMPLATE
        .replace("{reaction}", reaction)
        .replace("{title}", &request.job.title)
        .replace("{company}", &request.job.company)
        .replace("{description}", &description)
        .replace("{keywords}", &keywords)
}

/// Keeps well-formed items, up to `MAX_SUGGESTIONS`. Returns the kept
/// suggestions and how many items were dropped.
pub fn validate_suggestions(raw: Vec<Value>) -> (Vec<KeywordSuggestion>, usize) {
    let total = raw.len();
    let suggestions: Vec<KeywordSuggestion> = raw
        .into_iter()
        .filter_map(|item| {
            let keyword = item.get("keyword")?.as_str()?.trim().to_lowercase();
            let sentiment = item.get("sentiment")?.as_str()?.parse().ok()?;
            if keyword.is_empty() {
                return None;
            }
            let rationale = item
                .get("rationale")
                .and_then(Value::as_str)
                .map(|r| r.trim().to_string());
            Some(KeywordSuggestion {
                keyword,
                sentiment,
                rationale,
                confidence: None,
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect();
    let dropped = total - suggestions.len();
    (suggestions, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Polarity;
    use serde_json::json;

    struct FailingSuggester;

    #[async_trait]
    impl KeywordSuggester for FailingSuggester {
        async fn suggest(
            &self,
            _request: &SuggestionRequest<'_>,
        ) -> Result<Vec<KeywordSuggestion>, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    #[test]
    fn test_validate_drops_malformed_items() {
        let raw = vec![
            json!({"keyword": " Rust ", "sentiment": "positive", "rationale": "core"}),
            json!({"keyword": "sales", "sentiment": "NEGATIVE"}),
            json!({"keyword": "x", "sentiment": "meh"}),
            json!({"sentiment": "positive"}),
            json!("just a string"),
            json!({"keyword": "", "sentiment": "positive"}),
        ];
        let (suggestions, dropped) = validate_suggestions(raw);
        assert_eq!(dropped, 4);
        assert_eq!(suggestions[0].keyword, "rust");
        assert_eq!(suggestions[0].rationale.as_deref(), Some("core"));
        assert_eq!(suggestions[1].sentiment, Polarity::Negative);
    }

    #[test]
    fn test_validate_caps_count() {
        let raw: Vec<Value> = (0..15)
            .map(|i| json!({"keyword": format!("kw{i}"), "sentiment": "positive"}))
            .collect();
        let (suggestions, dropped) = validate_suggestions(raw);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(dropped, 5);
    }

    #[test]
    fn test_prompt_includes_job_and_profile() {
        let job = JobRecord::new("1", "Rust Engineer")
            .with_company("Acme")
            .with_description("é".repeat(2000));
        let keywords = vec![KeywordEntry::auto("rust", 1.5, Polarity::Positive)];
        let request = SuggestionRequest {
            job: &job,
            keywords: &keywords,
            feedback: Feedback::Dislike,
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("The user just disliked this job"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("rust (weight: 1.50, positive)"));
        assert!(!prompt.contains(&"é".repeat(DESCRIPTION_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn test_prompt_with_empty_profile() {
        let job = JobRecord::new("1", "Barista");
        let request = SuggestionRequest {
            job: &job,
            keywords: &[],
            feedback: Feedback::Like,
        };
        assert!(build_prompt(&request).contains("None yet"));
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let job = JobRecord::new("1", "Rust");
        let request = SuggestionRequest {
            job: &job,
            keywords: &[],
            feedback: Feedback::Like,
        };
        assert!(suggest_or_empty(&FailingSuggester, &request).await.is_empty());
        assert!(suggest_or_empty(&DisabledSuggester, &request).await.is_empty());
    }
}
