//! Matching core: normalization, component signals, composition, ranking

pub mod compatibility;
pub mod ranker;
pub mod recommendation;
pub mod scorer;
pub mod similarity;
pub mod skills;

pub use ranker::{rank_and_filter, RankPolicy};
pub use recommendation::RecommendationGenerator;
pub use scorer::{WeightPreset, WeightVector};
pub use similarity::{EmbeddingProvider, TextSimilarityScorer};
pub use skills::SkillNormalizer;
