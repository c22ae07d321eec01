use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job posting. Immutable once cached.
/// Missing text fields deserialize as empty strings and score as empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub job_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub salary: Option<f64>,
}

impl JobRecord {
    pub fn new(job_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            title: title.into(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            posted_at: None,
            url: String::new(),
            salary: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn posted(mut self, at: DateTime<Utc>) -> Self {
        self.posted_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let job: JobRecord = serde_json::from_str(r#"{"job_id": "a1"}"#).unwrap();
        assert_eq!(job.job_id, "a1");
        assert!(job.title.is_empty());
        assert!(job.description.is_empty());
        assert!(job.posted_at.is_none());
    }
}
