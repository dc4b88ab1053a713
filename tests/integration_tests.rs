//! Integration tests for the talent matcher

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use talent_matcher::matching::EmbeddingProvider;
use talent_matcher::models::{EducationRecord, SkillEntry};
use talent_matcher::sources::{InMemorySink, InMemorySource, ProfileSource};
use talent_matcher::{
    CandidateProfile, CancelFlag, Config, JobRequisition, MatchingEngine, Result, WeightVector,
};

/// Deterministic provider: a fixed vocabulary projection, so tests control
/// exactly how similar two texts are.
struct VocabProvider {
    vocabulary: Vec<&'static str>,
    calls: AtomicUsize,
}

impl VocabProvider {
    fn new() -> Self {
        Self {
            vocabulary: vec!["python", "rust", "sql", "aws", "docker", "react"],
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for VocabProvider {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        Ok(self
            .vocabulary
            .iter()
            .map(|term| if lower.contains(term) { 1.0 } else { 0.0 })
            .collect())
    }

    fn name(&self) -> &str {
        "vocab-stub"
    }
}

fn candidate(id: &str, skills: &[&str], years: f64, resume: &str) -> CandidateProfile {
    CandidateProfile {
        id: id.to_string(),
        name: format!("Candidate {}", id),
        skills: skills.iter().map(|s| SkillEntry::new(*s)).collect(),
        experience_years: years,
        education: vec![],
        resume_text: resume.to_string(),
    }
}

fn job() -> JobRequisition {
    JobRequisition {
        id: "backend-01".to_string(),
        title: "Senior Backend Engineer".to_string(),
        required_skills: vec!["python".to_string(), "sql".to_string(), "aws".to_string()],
        preferred_skills: vec!["docker".to_string()],
        min_experience: 3.0,
        education_preference: vec!["master".to_string()],
        description: "Backend services in python with sql and aws deployment".to_string(),
    }
}

#[tokio::test]
async fn test_end_to_end_single_match() {
    let engine = MatchingEngine::lexical().unwrap();
    let candidate = candidate(
        "c1",
        &["python", "sql"],
        4.0,
        "Python developer with strong sql background",
    );

    let result = engine.match_candidate(&candidate, &job(), None).await.unwrap();

    assert_eq!(result.candidate_id, "c1");
    assert_eq!(result.job_id, "backend-01");
    assert!(result.overall_score >= 0.0 && result.overall_score <= 100.0);
    assert!((result.components.skill - 2.0 / 4.0).abs() < 1e-12); // 2 of required+preferred
    assert_eq!(result.components.experience, 1.0);
    assert_eq!(result.components.education, 0.0);
    assert_eq!(result.missing_skills, vec!["aws"]);
    assert!((result.match_ratio - 2.0 / 3.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_embedding_backend_is_used_and_reused() {
    let provider = Arc::new(VocabProvider::new());
    let engine = MatchingEngine::from_config(&Config::default(), Some(provider.clone())).unwrap();

    let candidates = vec![
        candidate("c1", &["python"], 4.0, "python and sql services on aws"),
        candidate("c2", &["react"], 2.0, "react frontend work"),
        candidate("c3", &["python"], 5.0, "python sql aws docker"),
    ];

    let outcome = engine
        .rank_candidates(&candidates, &job(), None, None)
        .await
        .unwrap();

    assert!(outcome.failures.is_empty());
    assert!(!outcome.results.is_empty());
    // One reference encode for the job plus one per scored candidate.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1 + candidates.len());
}

#[tokio::test]
async fn test_ranking_is_deterministic_with_stub_backend() {
    let candidates = vec![
        candidate("c1", &["python", "sql", "aws"], 6.0, "python sql aws"),
        candidate("c2", &["python"], 1.0, "some python"),
        candidate("c3", &["sql", "aws"], 3.0, "sql aws work"),
    ];

    let run = || async {
        let provider = Arc::new(VocabProvider::new());
        let engine =
            MatchingEngine::from_config(&Config::default(), Some(provider)).unwrap();
        engine
            .rank_candidates(&candidates, &job(), None, None)
            .await
            .unwrap()
    };

    let first = run().await;
    let second = run().await;

    let scores = |o: &talent_matcher::RankOutcome| -> Vec<(String, f64)> {
        o.results
            .iter()
            .map(|r| (r.candidate_id.clone(), r.overall_score))
            .collect()
    };
    assert_eq!(scores(&first), scores(&second));
}

#[tokio::test]
async fn test_screening_preset_changes_the_ordering_signal() {
    let engine = MatchingEngine::lexical().unwrap();
    let candidate = candidate(
        "c1",
        &["python", "sql", "aws"],
        5.0,
        "Backend services in python with sql and aws deployment",
    );

    let detailed = engine
        .match_candidate(&candidate, &job(), Some(WeightVector::DETAILED))
        .await
        .unwrap();
    let screening = engine
        .match_candidate(&candidate, &job(), Some(WeightVector::SCREENING))
        .await
        .unwrap();

    // Identical components, different weighting.
    assert_eq!(detailed.components, screening.components);
    assert_ne!(detailed.overall_score, screening.overall_score);
}

#[tokio::test]
async fn test_rank_respects_limit_and_order() {
    let engine = MatchingEngine::lexical().unwrap();
    let candidates: Vec<CandidateProfile> = (0..10)
        .map(|i| {
            candidate(
                &format!("c{}", i),
                &["python", "sql", "aws"],
                i as f64,
                "python sql aws",
            )
        })
        .collect();

    let outcome = engine
        .rank_candidates(&candidates, &job(), None, Some(4))
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 4);
    assert!(outcome
        .results
        .windows(2)
        .all(|w| w[0].overall_score >= w[1].overall_score));
}

#[tokio::test]
async fn test_cancellation_yields_valid_prefix() {
    let engine = MatchingEngine::lexical().unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let candidates = vec![
        candidate("c1", &["python"], 2.0, "python"),
        candidate("c2", &["sql"], 2.0, "sql"),
    ];
    let outcome = engine
        .rank_candidates_with_cancel(&candidates, &job(), None, None, &cancel)
        .await
        .unwrap();

    assert!(outcome.truncated);
    assert!(outcome.results.is_empty());
    assert!(outcome.failures.is_empty());
}

/// Provider that trips a cancel flag from inside its second encode call,
/// so cancellation lands while the batch is mid-flight.
struct CancellingProvider {
    cancel: CancelFlag,
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CancellingProvider {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
            self.cancel.cancel();
        }
        Ok(vec![text.len() as f32, 1.0])
    }

    fn name(&self) -> &str {
        "cancelling-stub"
    }
}

#[tokio::test]
async fn test_cancel_mid_batch_keeps_sorted_prefix() {
    let cancel = CancelFlag::new();
    let provider = Arc::new(CancellingProvider {
        cancel: cancel.clone(),
        calls: AtomicUsize::new(0),
    });

    // One worker serializes dispatch: the first candidate's encode (the
    // second provider call overall, after the reference) trips the flag, so
    // the third candidate is never dispatched.
    let mut config = Config::default();
    config.batch.worker_limit = 1;
    let engine = MatchingEngine::from_config(&config, Some(provider)).unwrap();

    let candidates = vec![
        candidate("c1", &["python", "sql", "aws"], 5.0, "python sql aws"),
        candidate("c2", &["python", "sql"], 4.0, "python sql"),
        candidate("c3", &["python"], 3.0, "python"),
    ];
    let outcome = engine
        .rank_candidates_with_cancel(&candidates, &job(), None, None, &cancel)
        .await
        .unwrap();

    assert!(outcome.truncated);
    assert!(outcome.failures.is_empty());
    assert!(!outcome.results.is_empty());
    assert!(outcome.results.len() < candidates.len());
    assert!(outcome
        .results
        .windows(2)
        .all(|w| w[0].overall_score >= w[1].overall_score));
    assert!(outcome
        .results
        .iter()
        .all(|r| r.candidate_id != "c3"));
}

#[tokio::test]
async fn test_source_to_sink_flow() {
    let source = InMemorySource::new(
        vec![candidate("c1", &["python", "sql", "aws"], 4.0, "python sql aws")],
        vec![job()],
    );
    let sink = InMemorySink::new();
    let engine = MatchingEngine::lexical().unwrap();

    let candidate = source.candidate("c1").unwrap();
    let requisition = source.job("backend-01").unwrap();
    let result = engine
        .match_into(&candidate, &requisition, None, &sink)
        .await
        .unwrap();

    assert_eq!(sink.len(), 1);
    let stored = sink.get("c1", "backend-01").unwrap();
    assert_eq!(stored.overall_score, result.overall_score);
    assert_eq!(stored.recommendation, result.recommendation);
}

#[tokio::test]
async fn test_education_signal_flows_through() {
    let engine = MatchingEngine::lexical().unwrap();
    let mut with_degree = candidate("c1", &["python", "sql", "aws"], 4.0, "python");
    with_degree.education = vec![EducationRecord {
        level: "Master of Science".to_string(),
        field: "CS".to_string(),
        year: Some(2018),
    }];
    let without_degree = candidate("c2", &["python", "sql", "aws"], 4.0, "python");

    let a = engine.match_candidate(&with_degree, &job(), None).await.unwrap();
    let b = engine.match_candidate(&without_degree, &job(), None).await.unwrap();

    assert_eq!(a.components.education, 1.0);
    assert_eq!(b.components.education, 0.0);
    assert!(a.overall_score > b.overall_score);
}
