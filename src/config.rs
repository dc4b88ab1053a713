//! Configuration management for the matching engine

use crate::error::{MatcherError, Result};
use crate::matching::ranker::RankPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Default weight preset name: "screening" or "detailed".
    pub preset: String,
    /// Matching skills from this set earn an advanced-skills strength.
    pub high_value_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub min_match_ratio: f64,
    pub min_overall_score: f64,
    pub default_limit: usize,
    pub fallback_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on concurrently scored candidates.
    pub worker_limit: usize,
    /// Timeout for a single embedding backend call.
    pub backend_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig {
                preset: "detailed".to_string(),
                high_value_skills: vec![
                    "docker".to_string(),
                    "aws".to_string(),
                    "kubernetes".to_string(),
                    "machine learning".to_string(),
                    "ai".to_string(),
                ],
            },
            ranking: RankingConfig {
                min_match_ratio: 0.10,
                min_overall_score: 30.0,
                default_limit: 5,
                fallback_count: 3,
            },
            batch: BatchConfig {
                worker_limit: 8,
                backend_timeout_ms: 5000,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                MatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            MatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("talent-matcher")
            .join("config.toml")
    }

    pub fn rank_policy(&self) -> RankPolicy {
        RankPolicy {
            min_match_ratio: self.ranking.min_match_ratio,
            min_overall_score: self.ranking.min_overall_score,
            limit: self.ranking.default_limit,
            fallback_count: self.ranking.fallback_count,
        }
    }
}
