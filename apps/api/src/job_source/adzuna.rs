use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{JobQuery, JobSource, JobSourceError};
use crate::models::JobRecord;

const ADZUNA_API_URL: &str = "https://api.adzuna.com/v1/api/jobs";
const REQUEST_TIMEOUT_SECS: u64 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplayName {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    company: DisplayName,
    #[serde(default)]
    location: DisplayName,
    #[serde(default)]
    description: String,
    #[serde(default)]
    redirect_url: String,
    #[serde(default)]
    salary_min: Option<f64>,
    #[serde(default)]
    salary_max: Option<f64>,
    #[serde(default)]
    created: Option<String>,
}

impl AdzunaJob {
    /// `None` when the result has no usable id.
    fn into_record(self) -> Option<JobRecord> {
        let job_id = match self.id {
            serde_json::Value::String(s) if !s.trim().is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let posted_at = self
            .created
            .as_deref()
            .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Some(JobRecord {
            job_id,
            title: self.title,
            company: self.company.display_name,
            location: self.location.display_name,
            description: self.description,
            posted_at,
            url: self.redirect_url,
            salary: self.salary_min.or(self.salary_max),
        })
    }
}

/// Parses a search response body, skipping results without an id.
fn parse_results(body: &str) -> Result<Vec<JobRecord>, JobSourceError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .filter_map(AdzunaJob::into_record)
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AdzunaSource {
    client: Client,
    app_id: String,
    app_key: String,
    country: String,
    location: String,
}

impl AdzunaSource {
    pub fn new(
        app_id: String,
        app_key: String,
        country: String,
        location: String,
    ) -> Result<Self, JobSourceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            app_id,
            app_key,
            country,
            location,
        })
    }

    fn params(&self, query: &JobQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("app_id", self.app_id.clone()),
            ("app_key", self.app_key.clone()),
            ("results_per_page", query.limit.to_string()),
            ("where", self.location.clone()),
            ("sort_by", query.sort.as_str().to_string()),
        ];
        if let Some(days) = query.max_days_old {
            params.push(("max_days_old", days.to_string()));
        }
        if !query.keywords.is_empty() {
            params.push(("what", query.keywords.join(" ")));
        }
        if let Some(salary) = query.salary_min.filter(|s| *s > 0.0) {
            params.push(("salary_min", format!("{salary:.0}")));
        }
        params
    }
}

#[async_trait]
impl JobSource for AdzunaSource {
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, JobSourceError> {
        let url = format!("{ADZUNA_API_URL}/{}/search/1", self.country);
        let response = self
            .client
            .get(&url)
            .query(&self.params(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(JobSourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let jobs = parse_results(&body)?;
        info!(
            "Adzuna returned {} jobs for '{}'",
            jobs.len(),
            query.keywords.join(" ")
        );
        debug!(
            "Adzuna query params: sort_by={} max_days_old={:?}",
            query.sort.as_str(),
            query.max_days_old
        );
        Ok(jobs)
    }
}
