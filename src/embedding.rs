//! Embedding adapter over fastembed.
//!
//! One model instance is loaded at process start and shared read-only by the
//! server and the indexing job. The inner model sits behind a `Mutex` because
//! fastembed's `embed` takes `&mut self`.

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use fastembed::{InitOptions, TextEmbedding};
use std::sync::Mutex;
use tracing::info;

/// Text-to-vector interface shared by the search service and the indexing
/// job; both receive one instance injected at startup.
pub trait Embedder: Send + Sync {
    /// Embed a single text. Whitespace-only input maps to the zero vector of
    /// the model dimension without invoking the model; anything else is one
    /// model call, output L2-normalized.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension of the model.
    fn dimension(&self) -> usize;

    /// Model identifier, as configured.
    fn model_name(&self) -> &str;
}

/// Pre-trained sentence-embedding model (ONNX, local, no network at inference
/// time). Model files are downloaded to the cache directory on first use.
pub struct SentenceEmbedder {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl SentenceEmbedder {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let model = parse_model_name(&config.name)?;

        std::fs::create_dir_all(&config.cache_dir)?;

        // Model files are fetched on first use; this can take a while.
        info!(
            "Loading embedding model {} (cache: {})",
            config.name,
            config.cache_dir.display()
        );

        let options = InitOptions::new(model)
            .with_cache_dir(config.cache_dir.clone())
            .with_show_download_progress(true);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("model initialization failed: {e}")))?;

        let dimension = probe_dimension(&mut model)?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: config.name.clone(),
            dimension,
        })
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let mut model = self
            .model
            .lock()
            .map_err(|e| Error::Embedding(format!("model lock poisoned: {e}")))?;

        let mut embeddings = model
            .embed(vec![text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?;

        let embedding = embeddings
            .pop()
            .ok_or_else(|| Error::Embedding("model returned no embedding".to_string()))?;

        Ok(l2_normalize(embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        _ => Err(Error::Config(format!(
            "Unknown embedding model: {name}. Supported: all-MiniLM-L6-v2, \
             all-MiniLM-L6-v2-q, bge-small-en-v1.5, bge-base-en-v1.5"
        ))),
    }
}

/// Determine the output dimension by embedding a throwaway string once.
fn probe_dimension(model: &mut TextEmbedding) -> Result<usize> {
    let probe = model
        .embed(vec!["dimension probe"], None)
        .map_err(|e| Error::Embedding(format!("failed to probe dimension: {e}")))?;

    probe
        .first()
        .map(|v| v.len())
        .ok_or_else(|| Error::Embedding("model returned no embedding".to_string()))
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
