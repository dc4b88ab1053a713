//! Matching engine facade: single-pair scoring and batch ranking

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::matching::compatibility::{education_score, experience_score};
use crate::matching::ranker::{rank_and_filter, RankPolicy};
use crate::matching::recommendation::{ExplanationInput, RecommendationGenerator};
use crate::matching::scorer::{self, skill_overlap, WeightPreset, WeightVector};
use crate::matching::similarity::{EmbeddingProvider, TextSimilarityScorer};
use crate::matching::skills::SkillNormalizer;
use crate::models::{CandidateProfile, ComponentScores, JobRequisition, MatchResult};
use crate::sources::ResultSink;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cooperative cancellation handle for batch ranking. Checked between
/// per-candidate iterations; already-scored results stay valid.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One candidate whose scoring failed inside a batch. Isolated from the
/// rest of the batch and reported, never raised.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFailure {
    pub candidate_id: String,
    pub reason: String,
}

/// Batch ranking output: a partial, annotated result set.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RankOutcome {
    /// Stable-sorted, filtered, capped results.
    pub results: Vec<MatchResult>,
    /// Soft-failure tally, one entry per candidate that could not be scored.
    pub failures: Vec<CandidateFailure>,
    /// True when cancellation stopped the batch before every candidate was
    /// scored.
    pub truncated: bool,
}

struct EngineInner {
    normalizer: SkillNormalizer,
    similarity: TextSimilarityScorer,
    recommender: RecommendationGenerator,
    policy: RankPolicy,
    default_weights: WeightVector,
    worker_limit: usize,
}

/// Explicitly constructed matching engine. Built once by the host and passed
/// by reference to call sites; cheap to clone, all shared state read-only.
#[derive(Clone)]
pub struct MatchingEngine {
    inner: Arc<EngineInner>,
}

impl MatchingEngine {
    /// Build an engine from configuration and an optional embedding backend.
    pub fn from_config(
        config: &Config,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        let preset = WeightPreset::from_str(&config.scoring.preset)?;
        let normalizer = SkillNormalizer::new()?;
        let similarity = TextSimilarityScorer::new(
            provider,
            Duration::from_millis(config.batch.backend_timeout_ms),
        );
        let recommender =
            RecommendationGenerator::new(config.scoring.high_value_skills.iter().cloned());

        Ok(Self {
            inner: Arc::new(EngineInner {
                normalizer,
                similarity,
                recommender,
                policy: config.rank_policy(),
                default_weights: preset.weights(),
                worker_limit: config.batch.worker_limit.max(1),
            }),
        })
    }

    /// Engine over default configuration, lexical similarity only.
    pub fn lexical() -> Result<Self> {
        Self::from_config(&Config::default(), None)
    }

    pub fn default_weights(&self) -> WeightVector {
        self.inner.default_weights
    }

    /// Score one (candidate, job) pair. Deterministic given a deterministic
    /// backend; pure apart from the awaited similarity call.
    pub async fn match_candidate(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequisition,
        weights: Option<WeightVector>,
    ) -> Result<MatchResult> {
        job.validate()?;
        let weights = self.resolve_weights(weights)?;
        self.score_pair(candidate, job, weights, None).await
    }

    /// Score one pair and hand the completed result to the sink, exactly
    /// once. Nothing is written when scoring fails.
    pub async fn match_into(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequisition,
        weights: Option<WeightVector>,
        sink: &dyn ResultSink,
    ) -> Result<MatchResult> {
        let result = self.match_candidate(candidate, job, weights).await?;
        sink.upsert(&result.candidate_id, &result.job_id, &result)?;
        Ok(result)
    }

    /// Rank a candidate set against a job: parallel scoring map, then a
    /// single-threaded sort/filter/cap reduction.
    pub async fn rank_candidates(
        &self,
        candidates: &[CandidateProfile],
        job: &JobRequisition,
        weights: Option<WeightVector>,
        limit: Option<usize>,
    ) -> Result<RankOutcome> {
        self.rank_candidates_with_cancel(candidates, job, weights, limit, &CancelFlag::new())
            .await
    }

    /// Like [`rank_candidates`], checking `cancel` between per-candidate
    /// iterations. On cancellation the already-scored prefix is ranked and
    /// returned with `truncated` set.
    ///
    /// [`rank_candidates`]: MatchingEngine::rank_candidates
    pub async fn rank_candidates_with_cancel(
        &self,
        candidates: &[CandidateProfile],
        job: &JobRequisition,
        weights: Option<WeightVector>,
        limit: Option<usize>,
        cancel: &CancelFlag,
    ) -> Result<RankOutcome> {
        job.validate()?;
        let weights = self.resolve_weights(weights)?;

        if candidates.is_empty() {
            return Ok(RankOutcome::default());
        }

        // Encode the job text once and share it across the whole batch.
        let job_vector = self
            .inner
            .similarity
            .encode_reference(&job.description)
            .await
            .map(Arc::new);

        let semaphore = Arc::new(Semaphore::new(self.inner.worker_limit));
        let mut tasks = JoinSet::new();
        let mut truncated = false;

        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                log::debug!(
                    "batch ranking cancelled after dispatching {} of {} candidates",
                    index,
                    candidates.len()
                );
                truncated = true;
                break;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| MatcherError::BatchTask(e.to_string()))?;
            let engine = self.clone();
            let candidate = candidate.clone();
            let job = job.clone();
            let job_vector = job_vector.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let candidate_id = candidate.id.clone();
                let result = engine
                    .score_pair(&candidate, &job, weights, job_vector.as_deref().map(|v| &v[..]))
                    .await;
                (index, candidate_id, result)
            });
        }

        let mut scored: Vec<(usize, MatchResult)> = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(result))) => scored.push((index, result)),
                Ok((_, candidate_id, Err(e))) => {
                    log::warn!("candidate {} excluded from batch: {}", candidate_id, e);
                    failures.push(CandidateFailure {
                        candidate_id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => failures.push(CandidateFailure {
                    candidate_id: "<unknown>".to_string(),
                    reason: format!("task panicked: {}", e),
                }),
            }
        }

        // Restore input order so the stable sort preserves caller ordering
        // among equal scores.
        scored.sort_by_key(|(index, _)| *index);
        let results = scored.into_iter().map(|(_, result)| result).collect();

        let mut policy = self.inner.policy.clone();
        if let Some(limit) = limit {
            policy = policy.with_limit(limit);
        }

        Ok(RankOutcome {
            results: rank_and_filter(results, &policy),
            failures,
            truncated,
        })
    }

    async fn score_pair(
        &self,
        candidate: &CandidateProfile,
        job: &JobRequisition,
        weights: WeightVector,
        job_vector: Option<&[f32]>,
    ) -> Result<MatchResult> {
        candidate.validate()?;
        let inner = &self.inner;

        // Candidate tags: structured skill list plus taxonomy hits in the
        // résumé text.
        let skill_names: Vec<&str> = candidate.skills.iter().map(|s| s.name.as_str()).collect();
        let mut candidate_tags = inner.normalizer.normalize_list(&skill_names);
        candidate_tags.extend(inner.normalizer.extract(&candidate.resume_text));

        let required: BTreeSet<String> = inner.normalizer.normalize_list(&job.required_skills);
        let preferred: BTreeSet<String> = inner.normalizer.normalize_list(&job.preferred_skills);

        let overlap = skill_overlap(&candidate_tags, &required, &preferred);

        let text_similarity = match job_vector {
            Some(vector) => {
                inner
                    .similarity
                    .similarity_with_reference(
                        Some(vector),
                        &job.description,
                        &candidate.resume_text,
                    )
                    .await
            }
            None => {
                inner
                    .similarity
                    .similarity(&candidate.resume_text, &job.description)
                    .await
            }
        };

        let components = ComponentScores {
            skill: overlap.skill_score,
            experience: experience_score(candidate.experience_years, job.min_experience),
            education: education_score(&candidate.education, &job.education_preference),
            text_similarity,
        };

        let overall_score = scorer::combine(&components, &weights)?;

        let explanation = ExplanationInput {
            components: &components,
            matching_skills: &overlap.matching,
            missing_required: &overlap.missing_required,
            candidate_years: candidate.experience_years,
            required_years: job.min_experience,
        };
        let strengths = inner.recommender.strengths(&explanation);
        let weaknesses = inner.recommender.weaknesses(&explanation);
        // Label from the rounded score, so the displayed (score, label) pair
        // never straddles a threshold.
        let recommendation = inner.recommender.label(overall_score / 100.0);

        Ok(MatchResult {
            candidate_id: candidate.id.clone(),
            job_id: job.id.clone(),
            overall_score,
            components,
            match_ratio: overlap.match_ratio,
            matching_skills: overlap.matching,
            missing_skills: overlap.missing_required,
            strengths,
            weaknesses,
            recommendation,
            generated_at: Utc::now(),
        })
    }

    fn resolve_weights(&self, weights: Option<WeightVector>) -> Result<WeightVector> {
        let weights = weights.unwrap_or(self.inner.default_weights);
        weights.validate()?;
        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EducationRecord, RecommendationLabel, SkillEntry};

    fn engine() -> MatchingEngine {
        MatchingEngine::lexical().unwrap()
    }

    fn candidate(id: &str, skills: &[&str], years: f64) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            name: format!("Candidate {}", id),
            skills: skills.iter().map(|s| SkillEntry::new(*s)).collect(),
            experience_years: years,
            education: vec![],
            resume_text: String::new(),
        }
    }

    fn job(required: &[&str], min_experience: f64) -> JobRequisition {
        JobRequisition {
            id: "j1".to_string(),
            title: "Backend Engineer".to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: vec![],
            min_experience,
            education_preference: vec![],
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_worked_example() {
        // candidate {python, sql, 4y} vs job {python, sql, aws, 3y}
        let result = engine()
            .match_candidate(
                &candidate("c1", &["python", "sql"], 4.0),
                &job(&["python", "sql", "aws"], 3.0),
                None,
            )
            .await
            .unwrap();

        assert!((result.components.skill - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.components.experience, 1.0);
        assert_eq!(result.missing_skills, vec!["aws"]);
        assert!((result.match_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert!(result.overall_score >= 0.0 && result.overall_score <= 100.0);
    }

    #[tokio::test]
    async fn test_overall_score_reproduces_weighted_sum() {
        let weights = WeightVector::DETAILED;
        let result = engine()
            .match_candidate(
                &candidate("c1", &["python"], 2.0),
                &job(&["python", "go"], 4.0),
                Some(weights),
            )
            .await
            .unwrap();

        let expected =
            scorer::round_half_even(weights.weighted_sum(&result.components) * 100.0, 1);
        assert_eq!(result.overall_score, expected);
    }

    #[tokio::test]
    async fn test_determinism() {
        let c = candidate("c1", &["python", "docker"], 5.0);
        let j = job(&["python", "docker", "aws"], 3.0);
        let e = engine();

        let first = e.match_candidate(&c, &j, None).await.unwrap();
        let second = e.match_candidate(&c, &j, None).await.unwrap();
        assert_eq!(first.overall_score, second.overall_score);
        assert_eq!(first.components, second.components);
        assert_eq!(first.matching_skills, second.matching_skills);
        assert_eq!(first.strengths, second.strengths);
    }

    #[tokio::test]
    async fn test_invalid_weights_rejected() {
        let bad = WeightVector {
            skill: 0.9,
            experience: 0.9,
            education: 0.0,
            similarity: 0.0,
        };
        let err = engine()
            .match_candidate(&candidate("c1", &["python"], 1.0), &job(&["python"], 0.0), Some(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, MatcherError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_untitled_job_rejected() {
        let mut j = job(&["python"], 0.0);
        j.title = String::new();
        let err = engine()
            .match_candidate(&candidate("c1", &["python"], 1.0), &j, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MatcherError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_resume_text_contributes_skills() {
        let mut c = candidate("c1", &[], 3.0);
        c.resume_text = "Built data pipelines in Python with Postgres and k8s.".to_string();
        let result = engine()
            .match_candidate(&c, &job(&["python", "postgresql", "kubernetes"], 0.0), None)
            .await
            .unwrap();
        assert_eq!(result.components.skill, 1.0);
    }

    #[tokio::test]
    async fn test_recommendation_content() {
        let mut c = candidate("c1", &["python", "docker"], 7.0);
        c.education = vec![EducationRecord {
            level: "Master".to_string(),
            field: "CS".to_string(),
            year: Some(2016),
        }];
        let mut j = job(&["python", "docker"], 3.0);
        j.education_preference = vec!["master".to_string()];

        let result = engine().match_candidate(&c, &j, None).await.unwrap();
        assert!(result
            .strengths
            .iter()
            .any(|s| s.starts_with("Experience well above requirement")));
        assert!(result.strengths.iter().any(|s| s.contains("docker")));
        assert!(result.strengths.iter().any(|s| s == "Strong academic fit"));
        assert!(result.weaknesses.is_empty());
        assert_eq!(result.recommendation, RecommendationLabel::VeryRecommended);
    }

    #[tokio::test]
    async fn test_label_tracks_rounded_score() {
        // An unrounded weighted sum of 0.7996 displays as 80.0; the label
        // must agree with the displayed value, not the raw sum.
        let weights = WeightVector {
            skill: 0.0,
            experience: 1.0,
            education: 0.0,
            similarity: 0.0,
        };
        let result = engine()
            .match_candidate(&candidate("c1", &[], 1.999), &job(&[], 2.5), Some(weights))
            .await
            .unwrap();
        assert_eq!(result.overall_score, 80.0);
        assert_eq!(result.recommendation, RecommendationLabel::VeryRecommended);
    }

    #[tokio::test]
    async fn test_explicit_limit_caps_sparse_result_sets() {
        // A limit below the fallback floor is still a hard cap.
        let candidates = vec![
            candidate("c1", &["python"], 2.0),
            candidate("c2", &["python"], 5.0),
        ];
        let outcome = engine()
            .rank_candidates(&candidates, &job(&["python"], 4.0), None, Some(1))
            .await
            .unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].candidate_id, "c2");
    }

    #[tokio::test]
    async fn test_rank_empty_candidate_list() {
        let outcome = engine()
            .rank_candidates(&[], &job(&["python"], 0.0), None, None)
            .await
            .unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(!outcome.truncated);
    }

    #[tokio::test]
    async fn test_rank_bounds_and_fallback_floor() {
        let candidates: Vec<CandidateProfile> = (0..8)
            .map(|i| candidate(&format!("c{}", i), &["python"], i as f64))
            .collect();
        let outcome = engine()
            .rank_candidates(&candidates, &job(&["python"], 4.0), None, None)
            .await
            .unwrap();

        assert!(outcome.results.len() <= 5);
        assert!(outcome.results.len() >= 3);
        assert!(outcome
            .results
            .windows(2)
            .all(|w| w[0].overall_score >= w[1].overall_score));
    }

    #[tokio::test]
    async fn test_rank_isolates_per_candidate_failures() {
        let mut bad = candidate("bad", &["python"], 2.0);
        bad.experience_years = -3.0;
        let candidates = vec![
            candidate("c1", &["python"], 2.0),
            bad,
            candidate("c2", &["python"], 2.0),
        ];

        let outcome = engine()
            .rank_candidates(&candidates, &job(&["python"], 1.0), None, None)
            .await
            .unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].candidate_id, "bad");
        assert_eq!(outcome.results.len(), 2);
    }

    #[tokio::test]
    async fn test_pre_cancelled_batch_is_empty_and_truncated() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let candidates = vec![candidate("c1", &["python"], 2.0)];
        let outcome = engine()
            .rank_candidates_with_cancel(&candidates, &job(&["python"], 0.0), None, None, &cancel)
            .await
            .unwrap();
        assert!(outcome.truncated);
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_match_into_upserts_once() {
        use crate::sources::InMemorySink;

        let sink = InMemorySink::new();
        let result = engine()
            .match_into(
                &candidate("c1", &["python"], 2.0),
                &job(&["python"], 1.0),
                None,
                &sink,
            )
            .await
            .unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink.get("c1", "j1").unwrap().overall_score,
            result.overall_score
        );
    }
}
