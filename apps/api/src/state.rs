use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::feed::locks::UserLocks;
use crate::job_source::JobSource;
use crate::matching::scorer::JobScorer;
use crate::suggestions::KeywordSuggester;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Adzuna behind the Redis day cache in production.
    pub job_source: Arc<dyn JobSource>,
    /// LLM-backed, or disabled when no API key is configured.
    pub suggester: Arc<dyn KeywordSuggester>,
    /// Pluggable scorer. Default: KeywordScorer.
    pub scorer: Arc<dyn JobScorer>,
    pub user_locks: Arc<UserLocks>,
}
