use std::str::FromStr;

use anyhow::{Context, Result};

use crate::errors::ConfigError;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub adzuna_app_id: String,
    pub adzuna_app_key: String,
    /// Absent → keyword suggestions are disabled.
    pub anthropic_api_key: Option<String>,
    pub job_country: String,
    pub job_location: String,
    pub port: u16,
    pub rust_log: String,
    pub learning: LearningConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            adzuna_app_id: require_env("ADZUNA_APP_ID")?,
            adzuna_app_key: require_env("ADZUNA_APP_KEY")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            job_country: std::env::var("JOB_COUNTRY").unwrap_or_else(|_| "sg".to_string()),
            job_location: std::env::var("JOB_LOCATION")
                .unwrap_or_else(|_| "Singapore".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            learning: LearningConfig::from_env().context("Invalid learning configuration")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Constants of the scoring and online-learning rules.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningConfig {
    /// Ceiling on positive entries, manual included.
    pub top_k: usize,
    pub max_auto_positive: usize,
    pub max_manual_keywords: usize,
    pub max_negative: usize,
    /// Per-feedback caps on newly inserted suggestions.
    pub max_new_positive: usize,
    pub max_new_negative: usize,

    pub like_boost: f64,
    pub dislike_penalty: f64,
    pub decay: f64,
    pub negative_promote_at: f64,
    pub hard_negative_at: f64,
    pub negative_floor: f64,
    pub strong_seed: f64,
    pub neutral_seed: f64,

    pub match_count_cap: u32,
    pub max_keyword_contribution: f64,
    pub title_bonus: f64,
    pub only_negative_penalty: f64,
    pub min_score: f64,

    pub recent_window_days: i64,
    pub realtime_count: usize,
    pub digest_count: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            max_auto_positive: 5,
            max_manual_keywords: 3,
            max_negative: 20,
            max_new_positive: 3,
            max_new_negative: 2,
            like_boost: 1.0,
            dislike_penalty: -1.0,
            decay: 0.98,
            negative_promote_at: -2.0,
            hard_negative_at: -3.0,
            negative_floor: 0.3,
            strong_seed: 1.0,
            neutral_seed: 0.5,
            match_count_cap: 1,
            max_keyword_contribution: 5.0,
            title_bonus: 0.5,
            only_negative_penalty: 5.0,
            min_score: 0.0,
            recent_window_days: 7,
            realtime_count: 3,
            digest_count: 5,
        }
    }
}

impl LearningConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let config = Self {
            top_k: read(&lookup, "TOP_K", d.top_k)?,
            max_auto_positive: read(&lookup, "MAX_AUTO_POSITIVE", d.max_auto_positive)?,
            max_manual_keywords: read(&lookup, "MAX_MANUAL_KEYWORDS", d.max_manual_keywords)?,
            max_negative: read(&lookup, "MAX_NEGATIVE", d.max_negative)?,
            max_new_positive: read(&lookup, "MAX_NEW_POSITIVE", d.max_new_positive)?,
            max_new_negative: read(&lookup, "MAX_NEW_NEGATIVE", d.max_new_negative)?,
            like_boost: read(&lookup, "LIKE_BOOST", d.like_boost)?,
            dislike_penalty: read(&lookup, "DISLIKE_PENALTY", d.dislike_penalty)?,
            decay: read(&lookup, "DECAY", d.decay)?,
            negative_promote_at: read(&lookup, "NEGATIVE_PROMOTE_AT", d.negative_promote_at)?,
            hard_negative_at: read(&lookup, "HARD_NEGATIVE_AT", d.hard_negative_at)?,
            negative_floor: read(&lookup, "NEGATIVE_FLOOR", d.negative_floor)?,
            strong_seed: read(&lookup, "STRONG_SEED", d.strong_seed)?,
            neutral_seed: read(&lookup, "NEUTRAL_SEED", d.neutral_seed)?,
            match_count_cap: read(&lookup, "MATCH_COUNT_CAP", d.match_count_cap)?,
            max_keyword_contribution: read(
                &lookup,
                "MAX_KEYWORD_CONTRIBUTION",
                d.max_keyword_contribution,
            )?,
            title_bonus: read(&lookup, "TITLE_BONUS", d.title_bonus)?,
            only_negative_penalty: read(&lookup, "ONLY_NEGATIVE_PENALTY", d.only_negative_penalty)?,
            min_score: read(&lookup, "MIN_SCORE", d.min_score)?,
            recent_window_days: read(&lookup, "RECENT_WINDOW_DAYS", d.recent_window_days)?,
            realtime_count: read(&lookup, "REALTIME_COUNT", d.realtime_count)?,
            digest_count: read(&lookup, "DIGEST_COUNT", d.digest_count)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the learning rule meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("LIKE_BOOST", self.like_boost),
            ("DISLIKE_PENALTY", self.dislike_penalty),
            ("DECAY", self.decay),
            ("NEGATIVE_PROMOTE_AT", self.negative_promote_at),
            ("HARD_NEGATIVE_AT", self.hard_negative_at),
            ("NEGATIVE_FLOOR", self.negative_floor),
            ("STRONG_SEED", self.strong_seed),
            ("NEUTRAL_SEED", self.neutral_seed),
            ("MAX_KEYWORD_CONTRIBUTION", self.max_keyword_contribution),
            ("TITLE_BONUS", self.title_bonus),
            ("ONLY_NEGATIVE_PENALTY", self.only_negative_penalty),
            ("MIN_SCORE", self.min_score),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, "must be a finite number"));
            }
        }

        if self.top_k == 0 {
            return Err(ConfigError::invalid("TOP_K", "must be at least 1"));
        }
        if self.max_auto_positive > self.top_k {
            return Err(ConfigError::invalid(
                "MAX_AUTO_POSITIVE",
                "cannot exceed TOP_K",
            ));
        }
        if self.max_manual_keywords > self.top_k {
            return Err(ConfigError::invalid(
                "MAX_MANUAL_KEYWORDS",
                "cannot exceed TOP_K",
            ));
        }
        if self.like_boost <= 0.0 {
            return Err(ConfigError::invalid("LIKE_BOOST", "must be positive"));
        }
        if self.dislike_penalty >= 0.0 {
            return Err(ConfigError::invalid("DISLIKE_PENALTY", "must be negative"));
        }
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(ConfigError::invalid("DECAY", "must be in (0, 1]"));
        }
        if self.negative_promote_at >= 0.0 {
            return Err(ConfigError::invalid(
                "NEGATIVE_PROMOTE_AT",
                "must be negative",
            ));
        }
        if self.hard_negative_at > self.negative_promote_at {
            return Err(ConfigError::invalid(
                "HARD_NEGATIVE_AT",
                "must not be above NEGATIVE_PROMOTE_AT",
            ));
        }
        if self.negative_floor < 0.0 {
            return Err(ConfigError::invalid("NEGATIVE_FLOOR", "cannot be negative"));
        }
        if self.strong_seed <= 0.0 || self.neutral_seed <= 0.0 {
            return Err(ConfigError::invalid("STRONG_SEED", "seed weights must be positive"));
        }
        if self.match_count_cap == 0 {
            return Err(ConfigError::invalid("MATCH_COUNT_CAP", "must be at least 1"));
        }
        if self.max_keyword_contribution <= 0.0 {
            return Err(ConfigError::invalid(
                "MAX_KEYWORD_CONTRIBUTION",
                "must be positive",
            ));
        }
        if self.title_bonus < 0.0 || self.only_negative_penalty < 0.0 {
            return Err(ConfigError::invalid("TITLE_BONUS", "bonuses and penalties are magnitudes"));
        }
        if self.recent_window_days < 0 {
            return Err(ConfigError::invalid("RECENT_WINDOW_DAYS", "cannot be negative"));
        }
        Ok(())
    }
}

fn read<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Parse {
            key,
            value: raw.clone(),
        }),
    }
}
