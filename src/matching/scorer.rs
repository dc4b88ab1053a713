//! Composite scoring: weight presets, weighted combination, match ratio

use crate::error::{MatcherError, Result};
use crate::models::ComponentScores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights over the four component signals. Entries must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub skill: f64,
    pub experience: f64,
    pub education: f64,
    pub similarity: f64,
}

impl WeightVector {
    /// Full four-signal weighting used for in-depth evaluation.
    pub const DETAILED: WeightVector = WeightVector {
        skill: 0.4,
        experience: 0.3,
        education: 0.15,
        similarity: 0.15,
    };

    /// Similarity-heavy weighting for first-pass screening. The source
    /// system's soft-skills share lives in the skill component here.
    pub const SCREENING: WeightVector = WeightVector {
        skill: 0.1,
        experience: 0.2,
        education: 0.0,
        similarity: 0.7,
    };

    /// Reject vectors whose entries are not finite, negative, or don't sum
    /// to 1.0. Custom vectors are never silently renormalized.
    pub fn validate(&self) -> Result<()> {
        let entries = [self.skill, self.experience, self.education, self.similarity];
        if entries.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatcherError::InvalidInput(
                "weight vector entries must be non-negative numbers".to_string(),
            ));
        }
        let sum: f64 = entries.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatcherError::InvalidInput(format!(
                "weight vector must sum to 1.0, got {:.6}",
                sum
            )));
        }
        Ok(())
    }

    /// Weighted sum of the component scores, in [0, 1].
    pub fn weighted_sum(&self, components: &ComponentScores) -> f64 {
        self.skill * components.skill
            + self.experience * components.experience
            + self.education * components.education
            + self.similarity * components.text_similarity
    }
}

/// Named, selectable weight presets. The two observed formulas are kept as
/// parallel presets rather than collapsed into one guessed variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPreset {
    Screening,
    Detailed,
}

impl WeightPreset {
    pub fn weights(&self) -> WeightVector {
        match self {
            WeightPreset::Screening => WeightVector::SCREENING,
            WeightPreset::Detailed => WeightVector::DETAILED,
        }
    }
}

impl FromStr for WeightPreset {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "screening" => Ok(WeightPreset::Screening),
            "detailed" => Ok(WeightPreset::Detailed),
            other => Err(MatcherError::InvalidInput(format!(
                "unknown weight preset: {} (expected screening or detailed)",
                other
            ))),
        }
    }
}

/// Skill-set comparison between a candidate and a requisition, both sides
/// already normalized to canonical tags.
#[derive(Debug, Clone)]
pub struct SkillOverlap {
    /// Job skills (required or preferred) the candidate covers, sorted.
    pub matching: Vec<String>,
    /// Required skills the candidate lacks, sorted.
    pub missing_required: Vec<String>,
    /// Matched fraction of required + preferred skills.
    pub skill_score: f64,
    /// Matched fraction of required skills only; the ranker's pre-filter
    /// signal, independent of the weighted sum.
    pub match_ratio: f64,
}

pub fn skill_overlap(
    candidate_tags: &BTreeSet<String>,
    required: &BTreeSet<String>,
    preferred: &BTreeSet<String>,
) -> SkillOverlap {
    let job_tags: BTreeSet<&String> = required.iter().chain(preferred.iter()).collect();

    let matching: Vec<String> = job_tags
        .iter()
        .filter(|tag| candidate_tags.contains(**tag))
        .map(|tag| (*tag).clone())
        .collect();
    let missing_required: Vec<String> = required
        .iter()
        .filter(|tag| !candidate_tags.contains(*tag))
        .cloned()
        .collect();

    let matched_required = required.len() - missing_required.len();
    let skill_score = matching.len() as f64 / job_tags.len().max(1) as f64;
    let match_ratio = matched_required as f64 / required.len().max(1) as f64;

    SkillOverlap {
        matching,
        missing_required,
        skill_score,
        match_ratio,
    }
}

/// Combine component scores under a validated weight vector into the 0-100
/// overall score, one decimal, round-half-even.
pub fn combine(components: &ComponentScores, weights: &WeightVector) -> Result<f64> {
    weights.validate()?;
    Ok(round_half_even(weights.weighted_sum(components) * 100.0, 1))
}

/// Banker's rounding to the given number of decimals.
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    let floor = scaled.floor();
    let fraction = scaled - floor;

    let rounded = if (fraction - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / factor
}
