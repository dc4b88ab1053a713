//! Output formatters for match results and ranked candidate sets

use crate::engine::RankOutcome;
use crate::error::Result;
use crate::models::{JobRequisition, MatchResult, RecommendationLabel};
use colored::Colorize;

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

/// Trait for rendering a ranked outcome against its requisition.
pub trait OutputFormatter {
    fn format(&self, job: &JobRequisition, outcome: &RankOutcome) -> Result<String>;
}

/// Console formatter with colored score presentation.
pub struct ConsoleFormatter {
    use_colors: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        if !use_colors {
            colored::control::set_override(false);
        }
        Self { use_colors }
    }

    fn score_display(&self, result: &MatchResult) -> String {
        let text = format!("{:.1}", result.overall_score);
        if !self.use_colors {
            return text;
        }
        match result.recommendation {
            RecommendationLabel::VeryRecommended => text.green().bold().to_string(),
            RecommendationLabel::Recommended => text.green().to_string(),
            RecommendationLabel::Consider => text.yellow().to_string(),
            RecommendationLabel::NotRecommended => text.red().to_string(),
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, job: &JobRequisition, outcome: &RankOutcome) -> Result<String> {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} {} ({})",
            "Ranked candidates for".bold(),
            job.title.bold(),
            job.id
        ));
        lines.push(String::new());

        if outcome.results.is_empty() {
            lines.push("No candidates to rank.".to_string());
        }

        for (position, result) in outcome.results.iter().enumerate() {
            lines.push(format!(
                "{}. {}: score {} [{}]",
                position + 1,
                result.candidate_id,
                self.score_display(result),
                result.recommendation
            ));
            lines.push(format!(
                "   components: skill {:.2} | experience {:.2} | education {:.2} | similarity {:.2}",
                result.components.skill,
                result.components.experience,
                result.components.education,
                result.components.text_similarity
            ));
            if !result.matching_skills.is_empty() {
                lines.push(format!(
                    "   matching: {}",
                    result.matching_skills.join(", ")
                ));
            }
            if !result.missing_skills.is_empty() {
                lines.push(format!("   missing: {}", result.missing_skills.join(", ")));
            }
            for strength in &result.strengths {
                lines.push(format!("   + {}", strength));
            }
            for weakness in &result.weaknesses {
                lines.push(format!("   - {}", weakness));
            }
        }

        if !outcome.failures.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "{} candidate(s) could not be scored:",
                outcome.failures.len()
            ));
            for failure in &outcome.failures {
                lines.push(format!("   {}: {}", failure.candidate_id, failure.reason));
            }
        }

        if outcome.truncated {
            lines.push(String::new());
            lines.push("Batch was cancelled; results cover the scored prefix only.".to_string());
        }

        Ok(lines.join("\n"))
    }
}

/// JSON formatter for machine consumers.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, _job: &JobRequisition, outcome: &RankOutcome) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string(outcome)?
        };
        Ok(rendered)
    }
}
