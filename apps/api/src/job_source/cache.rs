use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use redis::AsyncCommands;
use tracing::{debug, warn};

use super::{JobQuery, JobSource, JobSourceError};
use crate::models::JobRecord;

/// Cached results live for one day; keys also carry the date.
pub const CACHE_TTL_SECS: u64 = 24 * 60 * 60;

pub fn cache_key(namespace: &str, date: NaiveDate, query: &JobQuery) -> String {
    format!("jobs:{namespace}:{date}:{}", query.cache_fragment())
}

/// Wraps a job source with a per-day Redis cache.
/// Redis failures bypass the cache; they never fail the search.
pub struct CachedJobSource {
    inner: Arc<dyn JobSource>,
    redis: redis::Client,
    namespace: String,
}

impl CachedJobSource {
    pub fn new(inner: Arc<dyn JobSource>, redis: redis::Client, namespace: String) -> Self {
        Self {
            inner,
            redis,
            namespace,
        }
    }

    async fn read(&self, key: &str) -> redis::RedisResult<Option<Vec<JobRecord>>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached.and_then(|payload| match serde_json::from_str(&payload) {
            Ok(jobs) => Some(jobs),
            Err(e) => {
                warn!("Discarding unreadable job cache entry {key}: {e}");
                None
            }
        }))
    }

    async fn write(&self, key: &str, jobs: &[JobRecord]) -> redis::RedisResult<()> {
        let Ok(payload) = serde_json::to_string(jobs) else {
            return Ok(());
        };
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, CACHE_TTL_SECS).await
    }
}

#[async_trait]
impl JobSource for CachedJobSource {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, JobSourceError> {
        let key = cache_key(&self.namespace, Utc::now().date_naive(), query);

        match self.read(&key).await {
            Ok(Some(jobs)) => {
                debug!("Job cache hit: {key} ({} jobs)", jobs.len());
                return Ok(jobs);
            }
            Ok(None) => debug!("Job cache miss: {key}"),
            Err(e) => warn!("Job cache unavailable: {e}"),
        }

        let jobs = self.inner.search(query).await?;
        if !jobs.is_empty() {
            if let Err(e) = self.write(&key, &jobs).await {
                warn!("Failed to cache job results: {e}");
            }
        }
        Ok(jobs)
    }
}
