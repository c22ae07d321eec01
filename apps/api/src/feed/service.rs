//! Glue between the pure matching core and its collaborators.
//!
//! Each operation loads what it needs, runs the core, and persists the
//! result. Profile writes hold the per-user lock for the whole
//! load → update → save sequence.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::job_source::{fetch_candidates, JobQuery, CUSTOM_SEARCH_FETCH, MAX_PAGE_SIZE};
use crate::matching::explain::{explain, summarize, KeywordSummary};
use crate::matching::manual::{add_manual_keyword, remove_manual_keyword, reset_profile};
use crate::matching::ranker::{rank_jobs, EmptyReason, RankDiagnostics, RankOptions, RankedBatch};
use crate::matching::updater::{update_profile, UpdateReport};
use crate::models::interaction::InteractionRow;
use crate::models::{
    Feedback, JobRecord, KeywordEntry, Polarity, UserProfile, UserSettings,
};
use crate::state::AppState;
use crate::store;
use crate::suggestions::{suggest_or_empty, SuggestionRequest};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// On-demand request from the user.
    #[default]
    Realtime,
    /// Scheduled digest.
    Digest,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub job: JobRecord,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub title_matches: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub user_id: i64,
    pub mode: BatchMode,
    pub jobs: Vec<Recommendation>,
    pub empty_reason: Option<EmptyReason>,
    pub diagnostics: RankDiagnostics,
}

impl Recommendations {
    pub fn from_batch(user_id: i64, mode: BatchMode, batch: RankedBatch) -> Self {
        let empty_reason = batch.diagnostics.empty_reason();
        let jobs = batch
            .jobs
            .into_iter()
            .map(|ranked| Recommendation {
                explanation: explain(&ranked.matched_keywords),
                job: ranked.job,
                score: ranked.score,
                matched_keywords: ranked.matched_keywords,
                title_matches: ranked.title_matches,
            })
            .collect();
        Self {
            user_id,
            mode,
            jobs,
            empty_reason,
            diagnostics: batch.diagnostics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub user_id: i64,
    pub query: String,
    /// Jobs the source returned before truncation.
    pub found: usize,
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResult {
    pub user_id: i64,
    pub job_id: String,
    pub feedback: Feedback,
    pub report: UpdateReport,
    pub keywords: KeywordSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    /// Zero or negative clears the filter.
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub notification_time: Option<NaiveTime>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn apply(&self, settings: &mut UserSettings) {
        if let Some(salary) = self.min_salary {
            settings.min_salary = (salary.is_finite() && salary > 0.0).then_some(salary);
        }
        if let Some(time) = self.notification_time {
            settings.notification_time = time;
        }
        if let Some(enabled) = self.notifications_enabled {
            settings.notifications_enabled = enabled;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

async fn require_profile(state: &AppState, user_id: i64) -> Result<UserProfile, AppError> {
    store::users::load_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

pub async fn register(
    state: &AppState,
    user_id: i64,
    username: Option<&str>,
) -> Result<UserProfile, AppError> {
    store::users::register_user(&state.db, user_id, username).await?;
    require_profile(state, user_id).await
}

/// Fetches candidates for the user's profile, ranks them and logs the
/// returned jobs as shown.
pub async fn recommend(
    state: &AppState,
    user_id: i64,
    mode: BatchMode,
    limit: Option<usize>,
) -> Result<Recommendations, AppError> {
    let learning = &state.config.learning;
    let profile = require_profile(state, user_id).await?;

    let limit = limit.unwrap_or(match mode {
        BatchMode::Realtime => learning.realtime_count,
        BatchMode::Digest => learning.digest_count,
    });
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let mut terms = profile.search_terms();
    terms.truncate(learning.top_k);
    let query = JobQuery::for_keywords(terms, profile.settings.min_salary, MAX_PAGE_SIZE);
    let candidates = fetch_candidates(state.job_source.as_ref(), &query).await;
    store::jobs::cache_jobs(&state.db, &candidates).await?;

    let recent =
        store::interactions::recently_seen(&state.db, user_id, learning.recent_window_days)
            .await?;
    let batch = rank_jobs(
        state.scorer.as_ref(),
        &candidates,
        &profile.keywords,
        &recent,
        RankOptions::new(limit, learning),
    );

    let shown: Vec<String> = batch.jobs.iter().map(|r| r.job.job_id.clone()).collect();
    store::interactions::log_shown(&state.db, user_id, &shown).await?;

    let result = Recommendations::from_batch(user_id, mode, batch);
    info!(
        "Recommended {} jobs to user {user_id} ({} candidates, reason: {:?})",
        result.jobs.len(),
        result.diagnostics.candidates,
        result.empty_reason
    );
    Ok(result)
}

/// Free-text search outside the profile. The first `limit` jobs, in source
/// relevance order, are cached and logged as shown so they can receive
/// feedback.
pub async fn search(
    state: &AppState,
    user_id: i64,
    text: &str,
    limit: Option<usize>,
) -> Result<SearchResults, AppError> {
    let query = JobQuery::custom(text, CUSTOM_SEARCH_FETCH);
    if query.keywords.is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let limit = limit.unwrap_or(state.config.learning.digest_count);
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }
    require_profile(state, user_id).await?;

    let mut jobs = fetch_candidates(state.job_source.as_ref(), &query).await;
    let found = jobs.len();
    jobs.truncate(limit);

    store::jobs::cache_jobs(&state.db, &jobs).await?;
    let shown: Vec<String> = jobs.iter().map(|j| j.job_id.clone()).collect();
    store::interactions::log_shown(&state.db, user_id, &shown).await?;

    let text = query.keywords.join(" ");
    info!("User {user_id} searched '{text}': {found} found, {} shown", jobs.len());
    Ok(SearchResults {
        user_id,
        query: text,
        found,
        jobs,
    })
}

/// Applies one learning cycle to the profile, then logs the feedback and
/// saves the new keywords together.
pub async fn record_feedback(
    state: &AppState,
    user_id: i64,
    job_id: &str,
    feedback: Feedback,
) -> Result<FeedbackResult, AppError> {
    if job_id.trim().is_empty() {
        return Err(AppError::Validation("job_id must not be empty".to_string()));
    }
    let _guard = state.user_locks.acquire(user_id).await;

    let profile = require_profile(state, user_id).await?;
    let job = store::jobs::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let suggestions = suggest_or_empty(
        state.suggester.as_ref(),
        &SuggestionRequest {
            job: &job,
            keywords: &profile.keywords,
            feedback,
        },
    )
    .await;

    let (profile, report) =
        update_profile(profile, &job, feedback, &suggestions, &state.config.learning);
    store::interactions::commit_feedback(&state.db, user_id, job_id, feedback, &profile.keywords)
        .await?;

    info!(
        "User {user_id} {:?} job {job_id}: {} matched, {} suggestions, {} pruned",
        feedback,
        report.matched.len(),
        report.suggestions_received,
        report.pruned.len()
    );

    Ok(FeedbackResult {
        user_id,
        job_id: job_id.to_string(),
        feedback,
        keywords: summarize(&profile.keywords, &state.config.learning),
        report,
    })
}

pub async fn keyword_summary(state: &AppState, user_id: i64) -> Result<KeywordSummary, AppError> {
    let profile = require_profile(state, user_id).await?;
    Ok(summarize(&profile.keywords, &state.config.learning))
}

pub async fn add_manual(
    state: &AppState,
    user_id: i64,
    keyword: &str,
    polarity: Polarity,
    hard: bool,
) -> Result<KeywordEntry, AppError> {
    let _guard = state.user_locks.acquire(user_id).await;
    let mut profile = require_profile(state, user_id).await?;
    let entry = add_manual_keyword(&mut profile, keyword, polarity, hard, &state.config.learning)?;
    store::keywords::replace_keywords(&state.db, user_id, &profile.keywords).await?;
    Ok(entry)
}

pub async fn remove_manual(state: &AppState, user_id: i64, keyword: &str) -> Result<(), AppError> {
    let _guard = state.user_locks.acquire(user_id).await;
    let mut profile = require_profile(state, user_id).await?;
    remove_manual_keyword(&mut profile, keyword)?;
    store::keywords::replace_keywords(&state.db, user_id, &profile.keywords).await?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResult {
    pub keywords_removed: usize,
    pub interactions_removed: u64,
    pub manual_kept: usize,
}

/// Forgets everything learned: auto keywords and interaction history.
pub async fn reset(state: &AppState, user_id: i64) -> Result<ResetResult, AppError> {
    let _guard = state.user_locks.acquire(user_id).await;
    let mut profile = require_profile(state, user_id).await?;
    let keywords_removed = reset_profile(&mut profile);
    store::keywords::replace_keywords(&state.db, user_id, &profile.keywords).await?;
    let interactions_removed = store::interactions::clear_interactions(&state.db, user_id).await?;

    info!("Reset profile of user {user_id}: {keywords_removed} keywords, {interactions_removed} interactions");
    Ok(ResetResult {
        keywords_removed,
        interactions_removed,
        manual_kept: profile.keywords.len(),
    })
}

/// Most recent interactions first.
pub async fn interaction_history(
    state: &AppState,
    user_id: i64,
    limit: i64,
) -> Result<Vec<InteractionRow>, AppError> {
    require_profile(state, user_id).await?;
    Ok(store::interactions::history(&state.db, user_id, limit.clamp(1, 500)).await?)
}

pub async fn update_settings(
    state: &AppState,
    user_id: i64,
    patch: &SettingsPatch,
) -> Result<UserSettings, AppError> {
    let _guard = state.user_locks.acquire(user_id).await;
    let mut settings = require_profile(state, user_id).await?.settings;
    patch.apply(&mut settings);
    store::users::update_settings(&state.db, user_id, &settings).await?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ranker::RankedJob;

    #[test]
    fn test_settings_patch_only_touches_given_fields() {
        let mut settings = UserSettings::default();
        SettingsPatch {
            min_salary: Some(4500.0),
            ..Default::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.min_salary, Some(4500.0));
        assert!(settings.notifications_enabled);

        SettingsPatch {
            min_salary: Some(0.0),
            notifications_enabled: Some(false),
            ..Default::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.min_salary, None);
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.notification_time, UserSettings::default().notification_time);
    }

    #[test]
    fn test_recommendations_carry_explanations() {
        let batch = RankedBatch {
            jobs: vec![RankedJob {
                job: JobRecord::new("1", "Rust Engineer"),
                score: 1.5,
                matched_keywords: vec!["rust".to_string()],
                title_matches: vec!["rust".to_string()],
            }],
            diagnostics: RankDiagnostics {
                candidates: 1,
                eligible: 1,
                returned: 1,
                ..Default::default()
            },
        };
        let result = Recommendations::from_batch(9, BatchMode::Realtime, batch);
        assert_eq!(result.jobs[0].explanation, "Matches your interests: rust");
        assert!(result.empty_reason.is_none());
    }

    #[test]
    fn test_empty_batch_reports_reason() {
        let batch = RankedBatch {
            jobs: vec![],
            diagnostics: RankDiagnostics::default(),
        };
        let result = Recommendations::from_batch(9, BatchMode::Digest, batch);
        assert_eq!(result.empty_reason, Some(EmptyReason::NoCandidates));
    }
}
