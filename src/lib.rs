//! Talent matcher library: candidate-to-job matching, scoring, and ranking

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod models;
pub mod output;
pub mod sources;

pub use config::Config;
pub use engine::{CancelFlag, MatchingEngine, RankOutcome};
pub use error::{MatcherError, Result};
pub use matching::{EmbeddingProvider, WeightPreset, WeightVector};
pub use models::{CandidateProfile, JobRequisition, MatchResult};
