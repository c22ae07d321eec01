use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Shown,
    Like,
    Dislike,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Shown => "shown",
            Action::Like => "like",
            Action::Dislike => "dislike",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shown" => Ok(Action::Shown),
            "like" => Ok(Action::Like),
            "dislike" => Ok(Action::Dislike),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit feedback on a job. `Shown` is not feedback and never reaches the updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Like,
    Dislike,
}

impl From<Feedback> for Action {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::Like => Action::Like,
            Feedback::Dislike => Action::Dislike,
        }
    }
}

/// Append-only interaction log row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InteractionRow {
    pub id: i64,
    pub user_id: i64,
    pub job_id: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
