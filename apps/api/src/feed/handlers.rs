use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::feed::service::{
    self, BatchMode, FeedbackResult, Recommendations, ResetResult, SearchResults, SettingsPatch,
};
use crate::matching::explain::KeywordSummary;
use crate::matching::ranker::{rank_jobs, RankOptions, RankedBatch};
use crate::models::interaction::InteractionRow;
use crate::models::{Feedback, JobRecord, KeywordEntry, Polarity, UserProfile, UserSettings};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// POST /api/v1/users
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let profile = service::register(&state, req.user_id, req.username.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/users/:id/keywords
pub async fn handle_get_keywords(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<KeywordSummary>, AppError> {
    Ok(Json(service::keyword_summary(&state, user_id).await?))
}

#[derive(Deserialize)]
pub struct ManualKeywordRequest {
    pub keyword: String,
    #[serde(default = "default_polarity")]
    pub polarity: Polarity,
    #[serde(default)]
    pub hard: bool,
}

fn default_polarity() -> Polarity {
    Polarity::Positive
}

/// POST /api/v1/users/:id/keywords
pub async fn handle_add_keyword(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<ManualKeywordRequest>,
) -> Result<(StatusCode, Json<KeywordEntry>), AppError> {
    let entry =
        service::add_manual(&state, user_id, &req.keyword, req.polarity, req.hard).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/v1/users/:id/keywords/:keyword
pub async fn handle_remove_keyword(
    State(state): State<AppState>,
    Path((user_id, keyword)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    service::remove_manual(&state, user_id, &keyword).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/users/:id/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<UserSettings>, AppError> {
    Ok(Json(service::update_settings(&state, user_id, &patch).await?))
}

/// POST /api/v1/users/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ResetResult>, AppError> {
    Ok(Json(service::reset(&state, user_id).await?))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/users/:id/interactions
pub async fn handle_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<InteractionRow>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(service::interaction_history(&state, user_id, limit).await?))
}

#[derive(Deserialize, Default)]
pub struct RecommendRequest {
    #[serde(default)]
    pub mode: BatchMode,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /api/v1/users/:id/recommendations
pub async fn handle_recommend(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    body: Option<Json<RecommendRequest>>,
) -> Result<Json<Recommendations>, AppError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(
        service::recommend(&state, user_id, req.mode, req.limit).await?,
    ))
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /api/v1/users/:id/search
pub async fn handle_search(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResults>, AppError> {
    Ok(Json(
        service::search(&state, user_id, &req.query, req.limit).await?,
    ))
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub job_id: String,
    pub feedback: Feedback,
}

/// POST /api/v1/users/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResult>, AppError> {
    Ok(Json(
        service::record_feedback(&state, user_id, &req.job_id, req.feedback).await?,
    ))
}

#[derive(Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
    #[serde(default)]
    pub recently_shown: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct RankResponse {
    #[serde(flatten)]
    pub batch: RankedBatch,
    pub empty_reason: Option<crate::matching::ranker::EmptyReason>,
}

/// POST /api/v1/rank
/// Ranks the given jobs against the given keywords. Touches no storage.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let learning = &state.config.learning;
    let limit = req.limit.unwrap_or(learning.realtime_count);
    let recent: HashSet<String> = req.recently_shown.into_iter().collect();
    let batch = rank_jobs(
        state.scorer.as_ref(),
        &req.jobs,
        &req.keywords,
        &recent,
        RankOptions::new(limit, learning),
    );
    Ok(Json(RankResponse {
        empty_reason: batch.diagnostics.empty_reason(),
        batch,
    }))
}
