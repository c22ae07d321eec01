//! Ranker: orders a job batch for one user.
//!
//! Two-stage filter then sort: recently shown jobs are dropped before scoring,
//! hard-rejected and below-threshold jobs after. Fully deterministic for
//! fixed inputs.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LearningConfig;
use crate::matching::scorer::{JobScore, JobScorer};
use crate::models::{JobRecord, KeywordEntry};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    pub limit: usize,
    /// Jobs scoring strictly below this are excluded.
    pub min_score: f64,
}

impl RankOptions {
    pub fn new(limit: usize, config: &LearningConfig) -> Self {
        Self {
            limit,
            min_score: config.min_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    pub job: JobRecord,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub title_matches: Vec<String>,
}

/// Why a ranking came back empty, so the caller can say something precise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoCandidates,
    AllRecentlyShown,
    AllHardRejected,
    AllBelowThreshold,
    /// Every candidate was excluded, by more than one filter.
    AllExcluded,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankDiagnostics {
    pub candidates: usize,
    pub duplicates: usize,
    pub excluded_recent: usize,
    pub hard_rejected: usize,
    pub excluded_negative: usize,
    pub eligible: usize,
    pub returned: usize,
    /// Per-job score for every job that reached the scorer, in input order.
    pub scores: Vec<JobScore>,
}

impl RankDiagnostics {
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if self.returned > 0 || self.eligible > 0 {
            return None;
        }
        let unique = self.candidates.saturating_sub(self.duplicates);
        if unique == 0 {
            return Some(EmptyReason::NoCandidates);
        }
        let reason = if self.excluded_recent == unique {
            EmptyReason::AllRecentlyShown
        } else if self.hard_rejected == unique {
            EmptyReason::AllHardRejected
        } else if self.excluded_negative == unique {
            EmptyReason::AllBelowThreshold
        } else {
            EmptyReason::AllExcluded
        };
        Some(reason)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedBatch {
    pub jobs: Vec<RankedJob>,
    pub diagnostics: RankDiagnostics,
}

/// Scores, filters, sorts and truncates a batch.
///
/// Order: score desc, posting time desc (undated last), job id asc.
pub fn rank_jobs(
    scorer: &dyn JobScorer,
    jobs: &[JobRecord],
    keywords: &[KeywordEntry],
    recently_shown: &HashSet<String>,
    options: RankOptions,
) -> RankedBatch {
    let mut diagnostics = RankDiagnostics {
        candidates: jobs.len(),
        ..Default::default()
    };

    let mut seen: HashSet<&str> = HashSet::with_capacity(jobs.len());
    let mut eligible: Vec<RankedJob> = Vec::new();

    for job in jobs {
        if !seen.insert(job.job_id.as_str()) {
            diagnostics.duplicates += 1;
            continue;
        }
        if recently_shown.contains(&job.job_id) {
            diagnostics.excluded_recent += 1;
            continue;
        }

        let job_score = scorer.score(job, keywords);
        match job_score.score() {
            None => diagnostics.hard_rejected += 1,
            Some(score) if score < options.min_score => diagnostics.excluded_negative += 1,
            Some(score) => eligible.push(RankedJob {
                job: job.clone(),
                score,
                matched_keywords: job_score.matched_keywords.clone(),
                title_matches: job_score.title_matches.clone(),
            }),
        }
        diagnostics.scores.push(job_score);
    }

    eligible.sort_by(compare_ranked);
    diagnostics.eligible = eligible.len();
    eligible.truncate(options.limit);
    diagnostics.returned = eligible.len();

    debug!(
        candidates = diagnostics.candidates,
        duplicates = diagnostics.duplicates,
        excluded_recent = diagnostics.excluded_recent,
        hard_rejected = diagnostics.hard_rejected,
        excluded_negative = diagnostics.excluded_negative,
        returned = diagnostics.returned,
        "Ranked job batch"
    );

    RankedBatch {
        jobs: eligible,
        diagnostics,
    }
}

fn compare_ranked(a: &RankedJob, b: &RankedJob) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| match (a.job.posted_at, b.job.posted_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.job.job_id.cmp(&b.job.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::KeywordScorer;
    use crate::models::Polarity;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn profile() -> Vec<KeywordEntry> {
        vec![
            KeywordEntry::auto("rust", 2.0, Polarity::Positive),
            KeywordEntry::auto("python", 1.0, Polarity::Positive),
            KeywordEntry::auto("sales", -1.0, Polarity::Negative),
            KeywordEntry::manual("unpaid", -1.0, Polarity::Negative).hard(),
        ]
    }

    fn rank(jobs: &[JobRecord], recent: &[&str], limit: usize) -> RankedBatch {
        let recent: HashSet<String> = recent.iter().map(|s| s.to_string()).collect();
        let options = RankOptions::new(limit, &LearningConfig::default());
        rank_jobs(&KeywordScorer::default(), jobs, &profile(), &recent, options)
    }

    #[test]
    fn test_ten_job_scenario() {
        let mut jobs = Vec::new();
        for i in 0..4 {
            jobs.push(JobRecord::new(format!("recent-{i}"), "Rust Engineer"));
        }
        for i in 0..3 {
            jobs.push(JobRecord::new(format!("neg-{i}"), "Sales Representative"));
        }
        for i in 0..3 {
            jobs.push(JobRecord::new(format!("ok-{i}"), "Python Developer"));
        }
        let batch = rank(&jobs, &["recent-0", "recent-1", "recent-2", "recent-3"], 10);

        assert_eq!(batch.jobs.len(), 3);
        assert_eq!(batch.diagnostics.excluded_recent, 4);
        assert_eq!(batch.diagnostics.excluded_negative, 3);
        assert_eq!(batch.diagnostics.hard_rejected, 0);
        assert!(batch.jobs.iter().all(|j| j.job.job_id.starts_with("ok-")));
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let jobs = vec![
            JobRecord::new("a", "Python Developer"),
            JobRecord::new("b", "Rust and Python Developer"),
            JobRecord::new("c", "Rust Developer"),
        ];
        let batch = rank(&jobs, &[], 2);
        let ids: Vec<&str> = batch.jobs.iter().map(|j| j.job.job_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(batch.diagnostics.eligible, 3);
        assert_eq!(batch.diagnostics.returned, 2);
    }

    #[test]
    fn test_ties_break_by_recency_then_id() {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let jobs = vec![
            JobRecord::new("z", "Rust Developer"),
            JobRecord::new("b", "Rust Developer").posted(base),
            JobRecord::new("a", "Rust Developer").posted(base),
            JobRecord::new("c", "Rust Developer").posted(base + Duration::days(1)),
        ];
        let batch = rank(&jobs, &[], 10);
        let ids: Vec<&str> = batch.jobs.iter().map(|j| j.job.job_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "z"]);
    }

    #[test]
    fn test_hard_rejects_counted_separately() {
        let jobs = vec![
            JobRecord::new("1", "Rust Intern").with_description("unpaid position"),
            JobRecord::new("2", "Rust Developer"),
        ];
        let batch = rank(&jobs, &[], 10);
        assert_eq!(batch.diagnostics.hard_rejected, 1);
        assert_eq!(batch.diagnostics.excluded_negative, 0);
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.diagnostics.scores.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_scored_once() {
        let jobs = vec![
            JobRecord::new("1", "Rust Developer"),
            JobRecord::new("1", "Rust Developer"),
        ];
        let batch = rank(&jobs, &[], 10);
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.diagnostics.duplicates, 1);
    }

    #[test]
    fn test_empty_reasons() {
        assert_eq!(
            rank(&[], &[], 5).diagnostics.empty_reason(),
            Some(EmptyReason::NoCandidates)
        );

        let jobs = vec![JobRecord::new("1", "Rust Developer")];
        assert_eq!(
            rank(&jobs, &["1"], 5).diagnostics.empty_reason(),
            Some(EmptyReason::AllRecentlyShown)
        );

        let jobs = vec![JobRecord::new("1", "Sales Lead")];
        assert_eq!(
            rank(&jobs, &[], 5).diagnostics.empty_reason(),
            Some(EmptyReason::AllBelowThreshold)
        );

        let jobs = vec![JobRecord::new("1", "Unpaid internship")];
        assert_eq!(
            rank(&jobs, &[], 5).diagnostics.empty_reason(),
            Some(EmptyReason::AllHardRejected)
        );

        let jobs = vec![
            JobRecord::new("1", "Unpaid internship"),
            JobRecord::new("2", "Sales Lead"),
        ];
        assert_eq!(
            rank(&jobs, &[], 5).diagnostics.empty_reason(),
            Some(EmptyReason::AllExcluded)
        );

        let jobs = vec![JobRecord::new("1", "Rust Developer")];
        assert_eq!(rank(&jobs, &[], 5).diagnostics.empty_reason(), None);
    }

    #[test]
    fn test_unmatched_jobs_score_zero_and_stay_eligible() {
        let jobs = vec![JobRecord::new("1", "Barista")];
        let batch = rank(&jobs, &[], 5);
        assert_eq!(batch.jobs.len(), 1);
        assert_eq!(batch.jobs[0].score, 0.0);
    }

    const TITLES: &[&str] = &[
        "Rust Developer",
        "Python Developer",
        "Sales Representative",
        "Unpaid Rust internship",
        "Barista",
        "Rust Python Engineer",
        "Python sales engineer",
    ];

    proptest! {
        #[test]
        fn prop_output_sorted_and_filtered(
            picks in prop::collection::vec((0..TITLES.len(), any::<bool>()), 0..30),
            limit in 0usize..12,
        ) {
            let jobs: Vec<JobRecord> = picks
                .iter()
                .enumerate()
                .map(|(i, (t, _))| JobRecord::new(format!("job-{i}"), TITLES[*t]))
                .collect();
            let recent: HashSet<String> = picks
                .iter()
                .enumerate()
                .filter(|(_, (_, r))| *r)
                .map(|(i, _)| format!("job-{i}"))
                .collect();

            let options = RankOptions::new(limit, &LearningConfig::default());
            let batch = rank_jobs(&KeywordScorer::default(), &jobs, &profile(), &recent, options);

            prop_assert!(batch.jobs.len() <= limit.min(batch.diagnostics.eligible));
            for pair in batch.jobs.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for ranked in &batch.jobs {
                prop_assert!(!recent.contains(&ranked.job.job_id));
                prop_assert!(ranked.score >= 0.0);
            }
            let d = &batch.diagnostics;
            prop_assert_eq!(
                d.excluded_recent + d.hard_rejected + d.excluded_negative + d.eligible + d.duplicates,
                d.candidates
            );
        }
    }
}
