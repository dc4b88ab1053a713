//! Consumed external interfaces: profile/job lookup and the result sink

use crate::error::Result;
use crate::models::{CandidateProfile, JobRequisition, MatchResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Read-only lookup over candidate and job records, supplied by the host's
/// storage collaborator.
pub trait ProfileSource: Send + Sync {
    fn candidate(&self, id: &str) -> Option<CandidateProfile>;
    fn job(&self, id: &str) -> Option<JobRequisition>;
    fn candidates(&self) -> Vec<CandidateProfile>;
}

/// Destination for completed matches. `upsert` is called exactly once per
/// completed match, never with a partial result.
pub trait ResultSink: Send + Sync {
    fn upsert(&self, candidate_id: &str, job_id: &str, result: &MatchResult) -> Result<()>;
}

/// In-memory source, mainly for tests and the CLI path.
#[derive(Default)]
pub struct InMemorySource {
    candidates: Vec<CandidateProfile>,
    jobs: Vec<JobRequisition>,
}

impl InMemorySource {
    pub fn new(candidates: Vec<CandidateProfile>, jobs: Vec<JobRequisition>) -> Self {
        Self { candidates, jobs }
    }
}

impl ProfileSource for InMemorySource {
    fn candidate(&self, id: &str) -> Option<CandidateProfile> {
        self.candidates.iter().find(|c| c.id == id).cloned()
    }

    fn job(&self, id: &str) -> Option<JobRequisition> {
        self.jobs.iter().find(|j| j.id == id).cloned()
    }

    fn candidates(&self) -> Vec<CandidateProfile> {
        self.candidates.clone()
    }
}

/// In-memory sink keyed by (candidate, job).
#[derive(Default)]
pub struct InMemorySink {
    results: Mutex<HashMap<(String, String), MatchResult>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, candidate_id: &str, job_id: &str) -> Option<MatchResult> {
        self.results
            .lock()
            .ok()?
            .get(&(candidate_id.to_string(), job_id.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for InMemorySink {
    fn upsert(&self, candidate_id: &str, job_id: &str, result: &MatchResult) -> Result<()> {
        if let Ok(mut results) = self.results.lock() {
            results.insert(
                (candidate_id.to_string(), job_id.to_string()),
                result.clone(),
            );
        }
        Ok(())
    }
}
