//! Tokenizer: normalizes free text into comparable tokens. Also holds the phrase
//! matching rule shared by the scorer and the profile updater.
//!
//! Match rule: a keyword matches when its token sequence occurs as a
//! contiguous run inside a single field's token sequence. There is no
//! substring matching, so "java" never matches "javascript".

use std::collections::BTreeSet;

use crate::models::JobRecord;

/// Tokens shorter than this are dropped.
pub const MIN_TOKEN_LEN: usize = 2;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of",
    "on", "or", "our", "the", "to", "we", "will", "with", "you", "your",
];

/// Deterministic, side-effect free text normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    pub min_len: usize,
    pub remove_stop_words: bool,
}

impl Default for Tokenizer {
    /// Stop words are kept so negative phrases like "no experience" stay intact.
    fn default() -> Self {
        Self {
            min_len: MIN_TOKEN_LEN,
            remove_stop_words: false,
        }
    }
}

impl Tokenizer {
    pub fn without_stop_words() -> Self {
        Self {
            remove_stop_words: true,
            ..Self::default()
        }
    }

    /// Lower-cases, splits on anything that is not a word character, and
    /// filters short tokens (and stop words when enabled). Order is preserved.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= self.min_len)
            .filter(|t| !(self.remove_stop_words && STOP_WORDS.contains(t)))
            .map(str::to_string)
            .collect()
    }

    pub fn token_set(&self, text: &str) -> BTreeSet<String> {
        self.tokens(text).into_iter().collect()
    }

    /// Canonical keyword text: tokens joined by single spaces.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Token set of `text` under the default tokenizer.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    Tokenizer::default().token_set(text)
}

/// Canonical keyword form under the default tokenizer.
pub fn normalize_keyword(text: &str) -> String {
    Tokenizer::default().normalize(text)
}

/// Number of (possibly overlapping) occurrences of `phrase` in `haystack`.
pub fn count_phrase(haystack: &[String], phrase: &[&str]) -> usize {
    if phrase.is_empty() || phrase.len() > haystack.len() {
        return 0;
    }
    haystack
        .windows(phrase.len())
        .filter(|window| window.iter().zip(phrase).all(|(a, b)| a == b))
        .count()
}

/// A job's text split into per-field token sequences.
#[derive(Debug, Clone, Default)]
pub struct TokenizedJob {
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub company: Vec<String>,
}

impl TokenizedJob {
    pub fn new(job: &JobRecord, tokenizer: &Tokenizer) -> Self {
        Self {
            title: tokenizer.tokens(&job.title),
            description: tokenizer.tokens(&job.description),
            company: tokenizer.tokens(&job.company),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.company.is_empty()
    }

    /// Occurrences of a normalized keyword across all fields.
    pub fn count(&self, keyword: &str) -> usize {
        let phrase: Vec<&str> = keyword.split_whitespace().collect();
        [&self.title, &self.description, &self.company]
            .into_iter()
            .map(|field| count_phrase(field, &phrase))
            .fold(0usize, usize::saturating_add)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.count(keyword) > 0
    }

    pub fn in_title(&self, keyword: &str) -> bool {
        let phrase: Vec<&str> = keyword.split_whitespace().collect();
        count_phrase(&self.title, &phrase) > 0
    }
}
