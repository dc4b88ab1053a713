//! Experience and education compatibility evaluators

use crate::models::EducationRecord;

/// Saturating linear ramp of candidate years against required years.
///
/// A requisition with no stated requirement never penalizes anyone; surplus
/// experience earns no extra credit here and is surfaced only by the
/// recommendation generator.
pub fn experience_score(candidate_years: f64, required_years: f64) -> f64 {
    if required_years <= 0.0 {
        return 1.0;
    }
    (candidate_years / required_years).min(1.0).max(0.0)
}

/// Coarse binary education signal.
///
/// No stated preference is neutral (0.5). A stated preference against an
/// empty education history is a miss (0.0). Otherwise any candidate level
/// that case-insensitively contains, or is contained by, a preferred level
/// is a hit (1.0).
pub fn education_score(candidate_education: &[EducationRecord], job_preference: &[String]) -> f64 {
    if job_preference.is_empty() {
        return 0.5;
    }
    if candidate_education.is_empty() {
        return 0.0;
    }

    for record in candidate_education {
        let level = record.level.to_lowercase();
        if level.is_empty() {
            continue;
        }
        for preferred in job_preference {
            let preferred = preferred.to_lowercase();
            if preferred.is_empty() {
                continue;
            }
            if level.contains(&preferred) || preferred.contains(&level) {
                return 1.0;
            }
        }
    }
    0.0
}
