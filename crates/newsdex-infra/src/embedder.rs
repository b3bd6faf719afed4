//! FastEmbed-based local embedding provider.
//!
//! Implements the `Embedder` trait from `newsdex-core` with fastembed's ONNX
//! runtime models. Model files are downloaded once into
//! `{data_dir}/models/` and reused afterwards.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use newsdex_core::embedding::Embedder;
use newsdex_types::error::EmbeddingError;

/// Embedding models Newsdex knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownModel {
    AllMiniLmL6V2,
    BgeSmallEnV15,
    BgeBaseEnV15,
}

impl KnownModel {
    pub const ALL: [KnownModel; 3] = [
        KnownModel::AllMiniLmL6V2,
        KnownModel::BgeSmallEnV15,
        KnownModel::BgeBaseEnV15,
    ];

    /// Look up a model by its configured name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(name))
    }

    /// Name recorded as the index's model identity.
    pub fn name(self) -> &'static str {
        match self {
            KnownModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            KnownModel::BgeSmallEnV15 => "bge-small-en-v1.5",
            KnownModel::BgeBaseEnV15 => "bge-base-en-v1.5",
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            KnownModel::AllMiniLmL6V2 | KnownModel::BgeSmallEnV15 => 384,
            KnownModel::BgeBaseEnV15 => 768,
        }
    }

    fn fastembed_model(self) -> EmbeddingModel {
        match self {
            KnownModel::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            KnownModel::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            KnownModel::BgeBaseEnV15 => EmbeddingModel::BGEBaseENV15,
        }
    }
}

/// Local embedder backed by a fastembed `TextEmbedding`.
///
/// Inference is CPU-bound, so it runs on tokio's blocking pool. The model is
/// shared behind a mutex; concurrent calls queue rather than load twice.
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    known: KnownModel,
}

impl FastEmbedEmbedder {
    /// Load `model_name`, downloading its files into `cache_dir` on first use.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        let known = KnownModel::from_name(model_name).ok_or_else(|| {
            let supported: Vec<&str> = KnownModel::ALL.iter().map(|m| m.name()).collect();
            EmbeddingError::Model(format!(
                "unsupported embedding model '{model_name}' (supported: {})",
                supported.join(", ")
            ))
        })?;

        let options = InitOptions::new(known.fastembed_model())
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::Model(format!("{}: {e}", known.name())))?;

        tracing::info!(model = known.name(), dimension = known.dimension(), "loaded embedding model");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            known,
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| EmbeddingError::Runtime("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Runtime(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Runtime(format!("embedding task failed: {e}")))?
    }

    fn model_name(&self) -> &str {
        self.known.name()
    }

    fn dimension(&self) -> usize {
        self.known.dimension()
    }
}
