//! Percentage similarity between two texts

use crate::error::{Result, ResumeScreenerError};
use crate::processing::embeddings::{cosine_similarity, Embedder};
use std::sync::Arc;

pub trait SimilarityScorer: Send + Sync {
    /// Similarity in `[0, 100]`, rounded to two decimals.
    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64>;
}

/// Embeds both texts in one batch and compares them by cosine.
pub struct EmbeddingSimilarity {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingSimilarity {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }
}

impl SimilarityScorer for EmbeddingSimilarity {
    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        let embeddings = self
            .embedder
            .embed(&[text_a.to_string(), text_b.to_string()])?;

        let [a, b] = embeddings.as_slice() else {
            return Err(ResumeScreenerError::Embedding(format!(
                "Expected 2 embeddings, got {}",
                embeddings.len()
            )));
        };

        let cosine = cosine_similarity(a, b)? as f64;
        Ok(to_percentage(cosine))
    }
}

/// Scale a cosine to a percentage, clamped to `[0, 100]`.
pub fn to_percentage(cosine: f64) -> f64 {
    round2((cosine * 100.0).clamp(0.0, 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
