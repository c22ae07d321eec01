//! Candidate job supply.
//!
//! `AdzunaSource` queries the Adzuna search API; `CachedJobSource` wraps any
//! source with a per-day Redis cache. Fetch failures never fail a
//! recommendation request: `fetch_candidates` logs and returns no jobs.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::JobRecord;

pub mod adzuna;
pub mod cache;

pub use adzuna::AdzunaSource;
pub use cache::CachedJobSource;

/// Adzuna caps `results_per_page` at this value.
pub const MAX_PAGE_SIZE: usize = 50;
/// Posting age limit for keyword searches.
pub const KEYWORD_SEARCH_MAX_DAYS: u32 = 7;
/// Posting age limit when the profile has no positive keywords yet.
pub const RECENT_SEARCH_MAX_DAYS: u32 = 3;
/// Jobs fetched for a free-text search.
pub const CUSTOM_SEARCH_FETCH: usize = 25;

#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Job API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse job API response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Date,
    Relevance,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Relevance => "relevance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    /// Empty → most recent postings, unfiltered.
    pub keywords: Vec<String>,
    pub salary_min: Option<f64>,
    /// `None` → no age limit.
    pub max_days_old: Option<u32>,
    pub limit: usize,
    pub sort: SortOrder,
}

impl JobQuery {
    /// Search by profile keywords, or for recent postings when there are none.
    pub fn for_keywords(keywords: Vec<String>, salary_min: Option<f64>, limit: usize) -> Self {
        let max_days_old = if keywords.is_empty() {
            RECENT_SEARCH_MAX_DAYS
        } else {
            KEYWORD_SEARCH_MAX_DAYS
        };
        Self {
            keywords,
            salary_min,
            max_days_old: Some(max_days_old),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            sort: SortOrder::Date,
        }
    }

    /// Free-text search typed by the user, best matches first, any age.
    pub fn custom(text: &str, limit: usize) -> Self {
        Self {
            keywords: text.split_whitespace().map(str::to_lowercase).collect(),
            salary_min: None,
            max_days_old: None,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            sort: SortOrder::Relevance,
        }
    }

    /// Stable text form of the query, used as part of cache keys.
    pub fn cache_fragment(&self) -> String {
        let salary = self
            .salary_min
            .map(|s| format!("{s:.0}"))
            .unwrap_or_else(|| "any".to_string());
        let age = self
            .max_days_old
            .map(|d| d.to_string())
            .unwrap_or_else(|| "any".to_string());
        format!(
            "{}|{}|{}|{}|{}",
            self.keywords.join(","),
            salary,
            age,
            self.limit,
            self.sort.as_str()
        )
    }
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, JobSourceError>;
}

/// Runs the query, degrading any source failure to an empty candidate list.
pub async fn fetch_candidates(source: &dyn JobSource, query: &JobQuery) -> Vec<JobRecord> {
    match source.search(query).await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("Job search failed ({e}); continuing with no candidates");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl JobSource for Unreachable {
        async fn search(&self, _query: &JobQuery) -> Result<Vec<JobRecord>, JobSourceError> {
            Err(JobSourceError::Api {
                status: 503,
                message: "down".to_string(),
            })
        }
    }

    #[test]
    fn test_query_without_keywords_uses_recent_window() {
        let query = JobQuery::for_keywords(vec![], None, 200);
        assert_eq!(query.max_days_old, Some(RECENT_SEARCH_MAX_DAYS));
        assert_eq!(query.limit, MAX_PAGE_SIZE);

        let query = JobQuery::for_keywords(vec!["rust".into()], Some(5000.0), 0);
        assert_eq!(query.max_days_old, Some(KEYWORD_SEARCH_MAX_DAYS));
        assert_eq!(query.limit, 1);
    }

    #[test]
    fn test_cache_fragment_distinguishes_queries() {
        let a = JobQuery::for_keywords(vec!["rust".into()], None, 50);
        let b = JobQuery::for_keywords(vec!["rust".into()], Some(4000.0), 50);
        assert_ne!(a.cache_fragment(), b.cache_fragment());
        assert_eq!(a.cache_fragment(), "rust|any|7|50|date");
    }

    #[test]
    fn test_custom_query_shape() {
        let query = JobQuery::custom("  Data   Analyst python ", CUSTOM_SEARCH_FETCH);
        assert_eq!(query.keywords, vec!["data", "analyst", "python"]);
        assert_eq!(query.max_days_old, None);
        assert_eq!(query.sort, SortOrder::Relevance);
        assert_eq!(query.limit, 25);
        assert_eq!(query.cache_fragment(), "data,analyst,python|any|any|25|relevance");

        let by_profile = JobQuery::for_keywords(query.keywords.clone(), None, 25);
        assert_ne!(query.cache_fragment(), by_profile.cache_fragment());
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_no_candidates() {
        let query = JobQuery::for_keywords(vec![], None, 10);
        assert!(fetch_candidates(&Unreachable, &query).await.is_empty());
    }
}
