use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::keyword::KeywordEntry;

/// Per-user scalar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub min_salary: Option<f64>,
    pub notification_time: NaiveTime,
    pub notifications_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            min_salary: None,
            notification_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            notifications_enabled: true,
        }
    }
}

/// A user's adaptive interest profile. Exclusively owns its keyword entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    /// Order is irrelevant for scoring; kept for display.
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
    #[serde(default)]
    pub settings: UserSettings,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    pub fn find(&self, text: &str) -> Option<&KeywordEntry> {
        self.keywords.iter().find(|k| k.text == text)
    }

    pub fn manual_count(&self) -> usize {
        self.keywords.iter().filter(|k| k.is_manual()).count()
    }

    /// Positive keyword texts, heaviest first. Used as the job search query.
    pub fn search_terms(&self) -> Vec<String> {
        let mut positives: Vec<&KeywordEntry> =
            self.keywords.iter().filter(|k| k.is_positive()).collect();
        positives.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.text.cmp(&b.text)));
        positives.into_iter().map(|k| k.text.clone()).collect()
    }
}

/// Row in `users`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub username: Option<String>,
    pub min_salary: Option<f64>,
    pub notification_time: NaiveTime,
    pub notifications_enabled: bool,
}

impl UserRow {
    pub fn into_profile(self, keywords: Vec<KeywordEntry>) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            username: self.username,
            keywords,
            settings: UserSettings {
                min_salary: self.min_salary,
                notification_time: self.notification_time,
                notifications_enabled: self.notifications_enabled,
            },
        }
    }
}
