//! CLI interface for the talent matcher

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "talent-matcher")]
#[command(about = "Match and rank candidate profiles against job requisitions")]
#[command(
    long_about = "Scores candidates against a job requisition over skill, experience, education, and text-similarity signals, then ranks and explains the results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a single candidate against a job requisition
    Match {
        /// Path to the candidate profile (JSON)
        #[arg(short, long)]
        candidate: PathBuf,

        /// Path to the job requisition (JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Weight preset: screening or detailed
        #[arg(short, long)]
        preset: Option<String>,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// Rank a candidate set against a job requisition
    Rank {
        /// Path to the candidate list (JSON array)
        #[arg(short, long)]
        candidates: PathBuf,

        /// Path to the job requisition (JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Weight preset: screening or detailed
        #[arg(short, long)]
        preset: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::output::formatter::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::output::formatter::OutputFormat::Console),
        "json" => Ok(crate::output::formatter::OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json",
            format
        )),
    }
}
