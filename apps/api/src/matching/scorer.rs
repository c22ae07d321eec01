//! Scorer: measures one job against a user's keyword profile.
//!
//! Default: `KeywordScorer` (pure, deterministic, no I/O).
//! The ranker takes any `JobScorer`, so an alternative backend can be swapped
//! in without touching ranking or handler code.

use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;
use crate::matching::tokenizer::{TokenizedJob, Tokenizer};
use crate::models::{JobRecord, KeywordEntry, Polarity};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Whether a job was scored or rejected outright by a hard negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored { score: f64 },
    HardRejected { keyword: String },
}

/// Score plus the evidence behind it, kept for logging and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobScore {
    pub job_id: String,
    #[serde(flatten)]
    pub outcome: ScoreOutcome,
    /// Every keyword that matched, positive and negative, in profile order.
    pub matched_keywords: Vec<String>,
    /// Positive keywords that matched in the title.
    pub title_matches: Vec<String>,
}

impl JobScore {
    /// Score of a scored job; `None` when hard-rejected.
    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            ScoreOutcome::Scored { score } => Some(score),
            ScoreOutcome::HardRejected { .. } => None,
        }
    }

    pub fn is_hard_rejected(&self) -> bool {
        matches!(self.outcome, ScoreOutcome::HardRejected { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scores a job against a keyword profile. Implementations must be pure.
pub trait JobScorer: Send + Sync {
    fn score(&self, job: &JobRecord, keywords: &[KeywordEntry]) -> JobScore;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordScorer
// ────────────────────────────────────────────────────────────────────────────

/// Linear keyword scorer.
///
/// Algorithm:
/// 1. Tokenize title, description and company per field.
/// 2. Any matching hard negative rejects the job immediately.
/// 3. Each matching soft negative subtracts `|weight|`.
/// 4. Each matching positive adds `max(weight, 0) × min(count, match_count_cap)`,
///    capped at `max_keyword_contribution`.
/// 5. Negatives matched with no positive match → subtract `only_negative_penalty`.
/// 6. Each positive matched in the title adds `title_bonus`.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    tokenizer: Tokenizer,
    match_count_cap: u32,
    max_keyword_contribution: f64,
    title_bonus: f64,
    only_negative_penalty: f64,
}

impl KeywordScorer {
    pub fn new(config: &LearningConfig) -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            match_count_cap: config.match_count_cap,
            max_keyword_contribution: config.max_keyword_contribution,
            title_bonus: config.title_bonus,
            only_negative_penalty: config.only_negative_penalty,
        }
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(&LearningConfig::default())
    }
}

impl JobScorer for KeywordScorer {
    fn score(&self, job: &JobRecord, keywords: &[KeywordEntry]) -> JobScore {
        let tokens = TokenizedJob::new(job, &self.tokenizer);
        // Entries are matched in tokenizer form; reports keep the stored text.
        let usable: Vec<(&KeywordEntry, String)> = keywords
            .iter()
            .filter(|k| k.weight.is_finite())
            .map(|k| (k, self.tokenizer.normalize(&k.text)))
            .filter(|(_, phrase)| !phrase.is_empty())
            .collect();

        if let Some((hard, _)) = usable
            .iter()
            .find(|(k, phrase)| k.is_negative() && k.hard && tokens.contains(phrase))
        {
            return JobScore {
                job_id: job.job_id.clone(),
                outcome: ScoreOutcome::HardRejected {
                    keyword: hard.text.clone(),
                },
                matched_keywords: vec![hard.text.clone()],
                title_matches: vec![],
            };
        }

        let mut score = 0.0_f64;
        let mut matched_keywords = Vec::new();
        let mut title_matches = Vec::new();
        let mut positive_matches = 0usize;
        let mut negative_matches = 0usize;

        for (entry, phrase) in &usable {
            let count = tokens.count(phrase);
            if count == 0 {
                continue;
            }
            matched_keywords.push(entry.text.clone());

            match entry.polarity {
                Polarity::Negative => {
                    score -= entry.magnitude();
                    negative_matches += 1;
                }
                Polarity::Positive => {
                    let capped = count.min(self.match_count_cap as usize) as f64;
                    let contribution =
                        (entry.weight.max(0.0) * capped).min(self.max_keyword_contribution);
                    score += contribution;
                    positive_matches += 1;
                    if tokens.in_title(phrase) {
                        title_matches.push(entry.text.clone());
                    }
                }
            }
        }

        if negative_matches > 0 && positive_matches == 0 {
            score -= self.only_negative_penalty;
        }

        score += self.title_bonus * title_matches.len() as f64;

        JobScore {
            job_id: job.job_id.clone(),
            outcome: ScoreOutcome::Scored { score },
            matched_keywords,
            title_matches,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
