//! Talent matcher: match and rank candidates against job requisitions

use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process;
use std::str::FromStr;

use talent_matcher::cli::{parse_output_format, Cli, Commands, ConfigAction};
use talent_matcher::matching::WeightPreset;
use talent_matcher::output::formatter::OutputFormat;
use talent_matcher::output::{ConsoleFormatter, JsonFormatter, OutputFormatter};
use talent_matcher::{
    CandidateProfile, Config, JobRequisition, MatcherError, MatchingEngine, RankOutcome, Result,
    WeightVector,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            candidate,
            job,
            preset,
            output,
        } => {
            let format = parse_output_format(&output).map_err(MatcherError::InvalidInput)?;
            let weights = resolve_preset(preset)?;

            let candidate: CandidateProfile = read_json(&candidate)?;
            let job: JobRequisition = read_json(&job)?;

            // No embedding backend is wired into the CLI; the engine runs on
            // the lexical path.
            let engine = MatchingEngine::from_config(&config, None)?;
            info!("scoring candidate {} against job {}", candidate.id, job.id);

            let result = engine.match_candidate(&candidate, &job, weights).await?;
            let outcome = RankOutcome {
                results: vec![result],
                failures: vec![],
                truncated: false,
            };
            println!("{}", render(format, &job, &outcome)?);
            Ok(())
        }

        Commands::Rank {
            candidates,
            job,
            preset,
            limit,
            output,
        } => {
            let format = parse_output_format(&output).map_err(MatcherError::InvalidInput)?;
            let weights = resolve_preset(preset)?;

            let candidates: Vec<CandidateProfile> = read_json(&candidates)?;
            let job: JobRequisition = read_json(&job)?;

            let engine = MatchingEngine::from_config(&config, None)?;
            info!(
                "ranking {} candidate(s) against job {}",
                candidates.len(),
                job.id
            );

            let outcome = engine
                .rank_candidates(&candidates, &job, weights, limit)
                .await?;
            println!("{}", render(format, &job, &outcome)?);
            Ok(())
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Reset) => {
                let config = Config::default();
                config.save()?;
                println!("Configuration reset to defaults.");
                Ok(())
            }
            _ => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| MatcherError::Configuration(e.to_string()))?;
                println!("{}", rendered);
                Ok(())
            }
        },
    }
}

fn resolve_preset(preset: Option<String>) -> Result<Option<WeightVector>> {
    match preset {
        Some(name) => Ok(Some(WeightPreset::from_str(&name)?.weights())),
        None => Ok(None),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}

fn render(
    format: OutputFormat,
    job: &JobRequisition,
    outcome: &RankOutcome,
) -> Result<String> {
    match format {
        OutputFormat::Console => ConsoleFormatter::new(true).format(job, outcome),
        OutputFormat::Json => JsonFormatter::new(true).format(job, outcome),
    }
}
