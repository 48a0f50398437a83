//! Sentence embeddings using Model2Vec

use crate::error::{Result, ResumeScreenerError};
use log::info;
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Anything that can turn texts into fixed-size vectors.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    model_name: String,
}

impl EmbeddingEngine {
    /// Load from a local model folder or a Hugging Face repo id.
    pub fn load(model_location: &Path) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_location.display());

        let model = StaticModel::from_pretrained(
            model_location,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_location.display().to_string(),
        })
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Loads the embedding model on first use and shares it afterwards.
///
/// Concurrent first calls block on the same initialisation; the model is
/// read-only once loaded.
pub struct LazyEmbedder {
    model_location: PathBuf,
    engine: OnceCell<Arc<EmbeddingEngine>>,
}

impl LazyEmbedder {
    pub fn new(model_location: PathBuf) -> Self {
        Self {
            model_location,
            engine: OnceCell::new(),
        }
    }

    pub fn engine(&self) -> Result<Arc<EmbeddingEngine>> {
        self.engine
            .get_or_try_init(|| EmbeddingEngine::load(&self.model_location).map(Arc::new))
            .cloned()
    }
}

impl Embedder for LazyEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.engine()?.embed(texts)
    }

    fn model_name(&self) -> &str {
        self.model_location.to_str().unwrap_or("embedding model")
    }
}

/// Cosine similarity; zero vectors compare as 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeScreenerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}
