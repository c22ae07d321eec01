use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Whether a keyword currently boosts or penalizes a job.
/// Authoritative over the sign of `weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }

    /// +1.0 for positive, -1.0 for negative.
    pub fn direction(&self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Polarity::Positive),
            "negative" => Ok(Polarity::Negative),
            other => Err(format!("unknown polarity '{other}'")),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who created a keyword. Manual entries are never deleted or overwritten by learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Manual,
    Auto,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Manual => "manual",
            Origin::Auto => "auto",
        }
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Origin::Manual),
            "auto" => Ok(Origin::Auto),
            other => Err(format!("unknown origin '{other}'")),
        }
    }
}

/// One learned interest or aversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Normalized text: tokenizer output joined by single spaces.
    pub text: String,
    pub weight: f64,
    pub polarity: Polarity,
    pub origin: Origin,
    /// Only meaningful for negative entries: presence rejects the job outright.
    #[serde(default)]
    pub hard: bool,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl KeywordEntry {
    pub fn auto(text: impl Into<String>, weight: f64, polarity: Polarity) -> Self {
        Self {
            text: text.into(),
            weight,
            polarity,
            origin: Origin::Auto,
            hard: false,
            rationale: None,
        }
    }

    pub fn manual(text: impl Into<String>, weight: f64, polarity: Polarity) -> Self {
        Self {
            origin: Origin::Manual,
            ..Self::auto(text, weight, polarity)
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn hard(mut self) -> Self {
        self.hard = true;
        self
    }

    pub fn is_manual(&self) -> bool {
        self.origin == Origin::Manual
    }

    pub fn is_negative(&self) -> bool {
        self.polarity == Polarity::Negative
    }

    pub fn is_positive(&self) -> bool {
        self.polarity == Polarity::Positive
    }

    /// Weight magnitude; the sign of `weight` is informational only.
    pub fn magnitude(&self) -> f64 {
        self.weight.abs()
    }
}

/// Row in `user_keywords`.
#[derive(Debug, Clone, FromRow)]
pub struct KeywordRow {
    pub keyword: String,
    pub weight: f64,
    pub polarity: String,
    pub origin: String,
    pub is_hard: bool,
    pub rationale: Option<String>,
}

impl From<KeywordRow> for KeywordEntry {
    fn from(row: KeywordRow) -> Self {
        // Unknown stored values degrade to the least privileged reading.
        let polarity = row.polarity.parse().unwrap_or(Polarity::Positive);
        let origin = row.origin.parse().unwrap_or(Origin::Auto);
        KeywordEntry {
            text: row.keyword,
            weight: row.weight,
            polarity,
            origin,
            hard: row.is_hard && polarity == Polarity::Negative,
            rationale: row.rationale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_parses_case_insensitively() {
        assert_eq!("Negative".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert_eq!(" positive ".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert!("neutral".parse::<Polarity>().is_err());
    }

    #[test]
    fn test_polarity_serde_snake_case() {
        let json = serde_json::to_string(&Polarity::Negative).unwrap();
        assert_eq!(json, r#""negative""#);
    }

    #[test]
    fn test_row_with_unknown_origin_reads_as_auto() {
        let row = KeywordRow {
            keyword: "rust".to_string(),
            weight: 1.5,
            polarity: "positive".to_string(),
            origin: "imported".to_string(),
            is_hard: true,
            rationale: None,
        };
        let entry = KeywordEntry::from(row);
        assert_eq!(entry.origin, Origin::Auto);
        // hard flag only survives on negatives
        assert!(!entry.hard);
    }

    #[test]
    fn test_magnitude_ignores_sign() {
        let entry = KeywordEntry::auto("sales", -1.25, Polarity::Negative);
        assert_eq!(entry.magnitude(), 1.25);
    }
}
