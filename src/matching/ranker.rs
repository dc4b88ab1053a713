//! Ranking, relevance filtering, and the non-empty fallback policy

use crate::models::MatchResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Relevance thresholds and result bounds for batch ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankPolicy {
    /// A candidate survives filtering with a match ratio above this...
    pub min_match_ratio: f64,
    /// ...or an overall score (0-100) above this.
    pub min_overall_score: f64,
    /// Cap on the returned result set.
    pub limit: usize,
    /// When fewer than this many candidates survive, the filter is discarded
    /// and the top `fallback_count` of the unfiltered set are returned.
    pub fallback_count: usize,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            min_match_ratio: 0.10,
            min_overall_score: 30.0,
            limit: 5,
            fallback_count: 3,
        }
    }
}

impl RankPolicy {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn keeps(&self, result: &MatchResult) -> bool {
        result.match_ratio > self.min_match_ratio || result.overall_score > self.min_overall_score
    }
}

/// Sort, filter, and cap a scored candidate set.
///
/// The sort is stable with no secondary key: equal scores preserve the
/// original relative order of `results`. A sparse strict filter must never
/// starve the caller, so when fewer candidates survive than the fallback
/// floor, the filter is dropped and the best of the unfiltered set are
/// returned instead. `limit` is a hard upper bound on either path; the
/// fallback floor never exceeds it.
pub fn rank_and_filter(results: Vec<MatchResult>, policy: &RankPolicy) -> Vec<MatchResult> {
    let surviving = results.iter().filter(|r| policy.keeps(r)).count();
    let fallback_floor = policy.fallback_count.min(policy.limit);

    if surviving < fallback_floor {
        let mut all = results;
        sort_by_score_desc(&mut all);
        all.truncate(fallback_floor);
        return all;
    }

    let mut kept: Vec<MatchResult> = results.into_iter().filter(|r| policy.keeps(r)).collect();
    sort_by_score_desc(&mut kept);
    kept.truncate(policy.limit);
    kept
}

fn sort_by_score_desc(results: &mut [MatchResult]) {
    // Vec::sort_by is stable; NaN cannot occur for validated inputs but
    // would compare as equal rather than panic.
    results.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
}
