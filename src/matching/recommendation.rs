//! Deterministic, rule-based strengths, weaknesses, and recommendation label

use crate::models::{ComponentScores, RecommendationLabel};
use std::collections::HashSet;

const SURPLUS_YEARS: f64 = 2.0;
const ACADEMIC_FIT_THRESHOLD: f64 = 0.8;
const ACADEMIC_MISMATCH_THRESHOLD: f64 = 0.3;
const MISSING_SKILLS_LISTED: usize = 3;

/// Derives templated explanation statements from a composite breakdown.
/// Never delegates to a stochastic generator.
pub struct RecommendationGenerator {
    high_value_skills: HashSet<String>,
}

/// Everything the rules consume for one (candidate, job) pair.
pub struct ExplanationInput<'a> {
    pub components: &'a ComponentScores,
    pub matching_skills: &'a [String],
    pub missing_required: &'a [String],
    pub candidate_years: f64,
    pub required_years: f64,
}

impl RecommendationGenerator {
    pub fn new(high_value_skills: impl IntoIterator<Item = String>) -> Self {
        Self {
            high_value_skills: high_value_skills
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    pub fn strengths(&self, input: &ExplanationInput<'_>) -> Vec<String> {
        let mut strengths = Vec::new();

        if input.candidate_years > input.required_years + SURPLUS_YEARS {
            strengths.push(format!(
                "Experience well above requirement ({} years vs {} required)",
                trim_years(input.candidate_years),
                trim_years(input.required_years)
            ));
        }

        let advanced: Vec<&str> = input
            .matching_skills
            .iter()
            .filter(|skill| self.high_value_skills.contains(&skill.to_lowercase()))
            .map(|s| s.as_str())
            .collect();
        if !advanced.is_empty() {
            strengths.push(format!("Advanced skills: {}", advanced.join(", ")));
        }

        if input.components.education > ACADEMIC_FIT_THRESHOLD {
            strengths.push("Strong academic fit".to_string());
        }

        strengths
    }

    pub fn weaknesses(&self, input: &ExplanationInput<'_>) -> Vec<String> {
        let mut weaknesses = Vec::new();

        if input.candidate_years < input.required_years {
            weaknesses.push(format!(
                "Experience below requirement ({} years vs {} required)",
                trim_years(input.candidate_years),
                trim_years(input.required_years)
            ));
        }

        if !input.missing_required.is_empty() {
            let listed: Vec<&str> = input
                .missing_required
                .iter()
                .take(MISSING_SKILLS_LISTED)
                .map(|s| s.as_str())
                .collect();
            weaknesses.push(format!("Missing required skills: {}", listed.join(", ")));
        }

        if input.components.education < ACADEMIC_MISMATCH_THRESHOLD {
            weaknesses.push("Education does not match the stated preference".to_string());
        }

        weaknesses
    }

    /// Label from the composite score on the [0, 1] scale.
    pub fn label(&self, overall: f64) -> RecommendationLabel {
        if overall >= 0.8 {
            RecommendationLabel::VeryRecommended
        } else if overall >= 0.6 {
            RecommendationLabel::Recommended
        } else if overall >= 0.4 {
            RecommendationLabel::Consider
        } else {
            RecommendationLabel::NotRecommended
        }
    }
}

/// Render years without a trailing ".0" for whole values.
fn trim_years(years: f64) -> String {
    if (years.fract()).abs() < 1e-9 {
        format!("{}", years as i64)
    } else {
        format!("{:.1}", years)
    }
}
