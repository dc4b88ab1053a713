//! Text similarity scoring: pluggable embedding backend with lexical fallback

use crate::error::{MatcherError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Injectable dense-vector backend. Absence of a provider (or any provider
/// failure) degrades to the lexical TF-IDF path, never to an error.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str {
        "embedding"
    }
}

/// Computes a [0, 1] similarity between two text blobs.
pub struct TextSimilarityScorer {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    backend_timeout: Duration,
}

impl TextSimilarityScorer {
    pub fn new(provider: Option<Arc<dyn EmbeddingProvider>>, backend_timeout: Duration) -> Self {
        Self {
            provider,
            backend_timeout,
        }
    }

    /// Purely lexical scorer, no backend configured.
    pub fn lexical_only() -> Self {
        Self::new(None, Duration::from_secs(5))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Similarity of two texts in [0, 1].
    ///
    /// Empty input on either side resolves to 0.0 without invoking any
    /// vectorizer: a two-document corpus with an empty document is
    /// degenerate, not an error.
    pub async fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.trim().is_empty() || b.trim().is_empty() {
            return 0.0;
        }

        if let Some(provider) = &self.provider {
            match self.embedding_similarity(provider.as_ref(), a, b).await {
                Ok(score) => return score,
                Err(e) => {
                    log::warn!(
                        "similarity backend '{}' degraded, using lexical fallback: {}",
                        provider.name(),
                        e
                    );
                }
            }
        }

        lexical_similarity(a, b)
    }

    /// Encode a reference text once for reuse across a batch. Returns `None`
    /// when no provider is configured or the encode fails; callers then run
    /// the lexical path per pair.
    pub async fn encode_reference(&self, text: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            return None;
        }
        let provider = self.provider.as_ref()?;
        match self.encode_with_timeout(provider.as_ref(), text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                log::warn!(
                    "similarity backend '{}' failed to encode reference text: {}",
                    provider.name(),
                    e
                );
                None
            }
        }
    }

    /// Similarity against a pre-encoded reference. `reference_text` is the
    /// text the reference vector was computed from, used by the lexical
    /// fallback when the backend degrades mid-batch.
    pub async fn similarity_with_reference(
        &self,
        reference: Option<&[f32]>,
        reference_text: &str,
        text: &str,
    ) -> f64 {
        if reference_text.trim().is_empty() || text.trim().is_empty() {
            return 0.0;
        }

        if let (Some(reference), Some(provider)) = (reference, &self.provider) {
            match self.encode_with_timeout(provider.as_ref(), text).await {
                Ok(vector) => match cosine_similarity(reference, &vector) {
                    Ok(cos) => return remap_cosine(cos),
                    Err(e) => log::warn!("embedding comparison failed: {}", e),
                },
                Err(e) => {
                    log::warn!(
                        "similarity backend '{}' degraded, using lexical fallback: {}",
                        provider.name(),
                        e
                    );
                }
            }
        }

        lexical_similarity(reference_text, text)
    }

    async fn embedding_similarity(
        &self,
        provider: &dyn EmbeddingProvider,
        a: &str,
        b: &str,
    ) -> Result<f64> {
        let va = self.encode_with_timeout(provider, a).await?;
        let vb = self.encode_with_timeout(provider, b).await?;
        let cos = cosine_similarity(&va, &vb)?;
        Ok(remap_cosine(cos))
    }

    async fn encode_with_timeout(
        &self,
        provider: &dyn EmbeddingProvider,
        text: &str,
    ) -> Result<Vec<f32>> {
        match tokio::time::timeout(self.backend_timeout, provider.encode(text)).await {
            Ok(result) => result,
            Err(_) => Err(MatcherError::Backend(format!(
                "encode timed out after {}ms",
                self.backend_timeout.as_millis()
            ))),
        }
    }
}

/// Cosine similarity of two dense vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MatcherError::Backend(format!(
            "embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Ok(0.0);
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Remap cosine from [-1, 1] onto [0, 1].
fn remap_cosine(cos: f64) -> f64 {
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// TF-IDF cosine over the two-document corpus {a, b}. Inherently >= 0, so no
/// remapping is applied.
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    let tf_a = term_frequencies(a);
    let tf_b = term_frequencies(b);

    if tf_a.is_empty() || tf_b.is_empty() {
        return 0.0;
    }
    // Identical token distributions are a perfect match by definition; skip
    // the floating-point round trip.
    if tf_a == tf_b {
        return 1.0;
    }

    let total_a: f64 = tf_a.values().sum::<usize>() as f64;
    let total_b: f64 = tf_b.values().sum::<usize>() as f64;

    // Smoothed IDF over a corpus of exactly two documents.
    let idf = |term: &str| -> f64 {
        let df = tf_a.contains_key(term) as usize + tf_b.contains_key(term) as usize;
        ((1.0 + 2.0) / (1.0 + df as f64)).ln() + 1.0
    };

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (term, count) in &tf_a {
        let w = (*count as f64 / total_a) * idf(term);
        norm_a += w * w;
        if let Some(other) = tf_b.get(term) {
            let w_other = (*other as f64 / total_b) * idf(term);
            dot += w * w_other;
        }
    }
    for (term, count) in &tf_b {
        let w = (*count as f64 / total_b) * idf(term);
        norm_b += w * w;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

fn term_frequencies(text: &str) -> HashMap<String, usize> {
    let mut tf = HashMap::new();
    for word in text.unicode_words() {
        let token = word.to_lowercase();
        if token.chars().any(|c| c.is_alphanumeric()) {
            *tf.entry(token).or_insert(0) += 1;
        }
    }
    tf
}
