//! Value types for candidates, requisitions, and match results

use crate::error::{MatcherError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single skill entry on a candidate profile, optionally with a
/// self-reported proficiency in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub proficiency: Option<f64>,
}

impl SkillEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proficiency: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationRecord {
    pub level: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Candidate profile as supplied by the ingestion collaborator.
/// The engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub education: Vec<EducationRecord>,
    #[serde(default)]
    pub resume_text: String,
}

impl CandidateProfile {
    /// Validate fields at the ingestion boundary, before any scoring runs.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatcherError::InvalidInput(
                "candidate id must not be empty".to_string(),
            ));
        }
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            return Err(MatcherError::InvalidInput(format!(
                "candidate {}: experience_years must be a non-negative number",
                self.id
            )));
        }
        for skill in &self.skills {
            if let Some(p) = skill.proficiency {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(MatcherError::InvalidInput(format!(
                        "candidate {}: proficiency for '{}' must be in [0, 1]",
                        self.id, skill.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Job requisition as supplied by the ingestion collaborator. Read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequisition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub min_experience: f64,
    #[serde(default)]
    pub education_preference: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl JobRequisition {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatcherError::InvalidInput(
                "job id must not be empty".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(MatcherError::InvalidInput(format!(
                "job {}: title must not be empty",
                self.id
            )));
        }
        if !self.min_experience.is_finite() || self.min_experience < 0.0 {
            return Err(MatcherError::InvalidInput(format!(
                "job {}: min_experience must be a non-negative number",
                self.id
            )));
        }
        Ok(())
    }
}

/// Per-signal scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub skill: f64,
    pub experience: f64,
    pub education: f64,
    pub text_similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationLabel {
    VeryRecommended,
    Recommended,
    Consider,
    NotRecommended,
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationLabel::VeryRecommended => "very-recommended",
            RecommendationLabel::Recommended => "recommended",
            RecommendationLabel::Consider => "consider",
            RecommendationLabel::NotRecommended => "not-recommended",
        };
        write!(f, "{}", s)
    }
}

/// Complete evaluation of one (candidate, job) pair. Built only once all
/// component scores have been computed, never partially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub job_id: String,
    /// Overall score on a 0-100 scale, one decimal, round-half-even.
    pub overall_score: f64,
    pub components: ComponentScores,
    /// Fraction of required skills covered by the candidate.
    pub match_ratio: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: RecommendationLabel,
    pub generated_at: DateTime<Utc>,
}
