//! Profile Updater: the online-learning rule applied on every like/dislike.
//!
//! `(keywords, feedback, suggestions) -> keywords'`, with no side effects.
//! One cycle: token deltas → suggestion merge → decay (once) → polarity
//! settlement → prune. Callers must serialize updates per user; the decay
//! step does not commute with interleaved deltas.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LearningConfig;
use crate::matching::merge::{merge_suggestions, KeywordSuggestion, MergeReport};
use crate::matching::tokenizer::{normalize_keyword, TokenizedJob, Tokenizer};
use crate::models::{Feedback, JobRecord, KeywordEntry, Polarity, UserProfile};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Existing keywords found in the job, adjusted by the feedback delta.
    pub matched: Vec<String>,
    pub suggestions_received: usize,
    pub merge: MergeReport,
    /// Auto entries moved from positive to negative.
    pub promoted: Vec<String>,
    /// Auto entries moved from negative back to positive.
    pub demoted: Vec<String>,
    /// Auto negatives that became hard negatives.
    pub hardened: Vec<String>,
    pub pruned: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub keywords: Vec<KeywordEntry>,
    pub report: UpdateReport,
}

/// Applies one feedback event to a profile, returning the next profile.
pub fn update_profile(
    mut profile: UserProfile,
    job: &JobRecord,
    feedback: Feedback,
    suggestions: &[KeywordSuggestion],
    config: &LearningConfig,
) -> (UserProfile, UpdateReport) {
    let keywords = std::mem::take(&mut profile.keywords);
    let outcome = apply_feedback(keywords, job, feedback, suggestions, config);
    profile.keywords = outcome.keywords;
    (profile, outcome.report)
}

/// Full update cycle over a keyword set.
pub fn apply_feedback(
    mut keywords: Vec<KeywordEntry>,
    job: &JobRecord,
    feedback: Feedback,
    suggestions: &[KeywordSuggestion],
    config: &LearningConfig,
) -> UpdateOutcome {
    let tokens = TokenizedJob::new(job, &Tokenizer::default());
    let matched = apply_token_deltas(&mut keywords, &tokens, feedback, config);

    let merged = merge_suggestions(keywords, suggestions, feedback, config);
    let mut keywords = merged.keywords;

    apply_decay(&mut keywords, config.decay);

    let mut report = UpdateReport {
        matched,
        suggestions_received: suggestions.len(),
        merge: merged.report,
        ..Default::default()
    };
    settle_polarity(&mut keywords, config, &mut report);
    let (keywords, pruned) = prune(keywords, config);
    report.pruned = pruned;

    debug!(
        job_id = %job.job_id,
        feedback = ?feedback,
        empty_job = tokens.is_empty(),
        matched = report.matched.len(),
        inserted = report.merge.inserted_positive + report.merge.inserted_negative,
        promoted = report.promoted.len(),
        pruned = report.pruned.len(),
        "Applied feedback to keyword profile"
    );

    UpdateOutcome { keywords, report }
}

/// Moves every keyword present in the job by `like_boost` or `dislike_penalty`.
/// Returns the matched keyword texts.
pub fn apply_token_deltas(
    keywords: &mut [KeywordEntry],
    tokens: &TokenizedJob,
    feedback: Feedback,
    config: &LearningConfig,
) -> Vec<String> {
    let delta = match feedback {
        Feedback::Like => config.like_boost,
        Feedback::Dislike => config.dislike_penalty,
    };
    let mut matched = Vec::new();
    for entry in keywords.iter_mut() {
        let phrase = normalize_keyword(&entry.text);
        if !phrase.is_empty() && tokens.contains(&phrase) {
            entry.weight += delta;
            matched.push(entry.text.clone());
        }
    }
    matched
}

/// Multiplies every weight by `factor`.
pub fn apply_decay(keywords: &mut [KeywordEntry], factor: f64) {
    for entry in keywords.iter_mut() {
        entry.weight *= factor;
    }
}

/// Promotes, demotes and hardens auto entries. Manual entries keep their polarity.
fn settle_polarity(keywords: &mut [KeywordEntry], config: &LearningConfig, report: &mut UpdateReport) {
    for entry in keywords.iter_mut().filter(|k| !k.is_manual()) {
        match entry.polarity {
            Polarity::Positive if entry.weight < config.negative_promote_at => {
                entry.polarity = Polarity::Negative;
                report.promoted.push(entry.text.clone());
            }
            Polarity::Negative if entry.weight > 0.0 => {
                entry.polarity = Polarity::Positive;
                entry.hard = false;
                report.demoted.push(entry.text.clone());
            }
            _ => {}
        }
        if entry.is_negative() && !entry.hard && entry.weight <= config.hard_negative_at {
            entry.hard = true;
            report.hardened.push(entry.text.clone());
        }
    }
}

fn by_weight_desc(a: &&KeywordEntry, b: &&KeywordEntry) -> Ordering {
    b.weight.total_cmp(&a.weight).then_with(|| a.text.cmp(&b.text))
}

fn by_magnitude_desc(a: &&KeywordEntry, b: &&KeywordEntry) -> Ordering {
    b.magnitude()
        .total_cmp(&a.magnitude())
        .then_with(|| a.text.cmp(&b.text))
}

/// Bounds the profile size.
///
/// - manual entries: always kept
/// - auto positives: top-weighted, up to `max_auto_positive` and the room left
///   under `top_k` after manual positives
/// - auto negatives: those with `|weight| >= negative_floor`, strongest
///   `max_negative` of them
///
/// Survivors keep their original order. Returns the kept entries and the
/// texts that were dropped.
pub fn prune(keywords: Vec<KeywordEntry>, config: &LearningConfig) -> (Vec<KeywordEntry>, Vec<String>) {
    let manual_positive = keywords
        .iter()
        .filter(|k| k.is_manual() && k.is_positive())
        .count();
    let auto_positive_room = config
        .max_auto_positive
        .min(config.top_k.saturating_sub(manual_positive));

    let mut auto_positive: Vec<&KeywordEntry> = keywords
        .iter()
        .filter(|k| !k.is_manual() && k.is_positive())
        .collect();
    auto_positive.sort_by(by_weight_desc);

    let mut auto_negative: Vec<&KeywordEntry> = keywords
        .iter()
        .filter(|k| !k.is_manual() && k.is_negative())
        .filter(|k| k.magnitude() >= config.negative_floor)
        .collect();
    auto_negative.sort_by(by_magnitude_desc);

    let keep: HashSet<String> = auto_positive
        .into_iter()
        .take(auto_positive_room)
        .chain(auto_negative.into_iter().take(config.max_negative))
        .map(|k| k.text.clone())
        .collect();

    let (kept, dropped): (Vec<KeywordEntry>, Vec<KeywordEntry>) = keywords
        .into_iter()
        .partition(|k| k.is_manual() || keep.contains(&k.text));

    (kept, dropped.into_iter().map(|k| k.text).collect())
}
