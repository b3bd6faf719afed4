//! Application state wiring stores and services together.
//!
//! AppState pins the generic core services to the concrete infra
//! implementations. The embedding model is loaded lazily: `ingest` and
//! `status` never need it, and loading it may download model files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use newsdex_core::builder::{BuildOptions, IndexBuilder};
use newsdex_core::embedding::BoxEmbedder;
use newsdex_core::ingest::IngestService;
use newsdex_infra::config::load_config;
use newsdex_infra::embedder::FastEmbedEmbedder;
use newsdex_infra::filesystem::{corpus_path, index_dir, models_dir, resolve_data_dir};
use newsdex_infra::store::{FileIndexStore, JsonDocumentStore};
use newsdex_types::config::NewsdexConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteIngestService = IngestService<JsonDocumentStore>;

pub type ConcreteIndexBuilder = IndexBuilder<JsonDocumentStore, FileIndexStore>;

/// Shared application state used by every CLI command.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: NewsdexConfig,
    pub documents: JsonDocumentStore,
    pub index_store: FileIndexStore,
    pub ingest_service: ConcreteIngestService,
}

impl AppState {
    /// Resolve the data directory, load config, and wire the stores.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        let documents = JsonDocumentStore::new(corpus_path(&data_dir));
        let index_store = FileIndexStore::new(index_dir(&data_dir));
        let ingest_service = IngestService::new(documents.clone());

        Ok(Self {
            data_dir,
            config,
            documents,
            index_store,
            ingest_service,
        })
    }

    /// Load the configured embedding model.
    ///
    /// Model loading reads (and on first use downloads) ONNX files, so it runs
    /// on the blocking pool.
    pub async fn load_embedder(&self) -> anyhow::Result<Arc<BoxEmbedder>> {
        let model_name = self.config.embedding_model.clone();
        let cache_dir = models_dir(&self.data_dir);

        let embedder = tokio::task::spawn_blocking(move || FastEmbedEmbedder::new(&model_name, cache_dir))
            .await
            .context("Embedding model loader panicked")?
            .with_context(|| {
                format!("Failed to load embedding model '{}'", self.config.embedding_model)
            })?;

        Ok(Arc::new(BoxEmbedder::new(embedder)))
    }

    /// Wire an index builder over the corpus and index stores.
    pub fn index_builder(&self, embedder: Arc<BoxEmbedder>, options: BuildOptions) -> ConcreteIndexBuilder {
        IndexBuilder::new(
            self.documents.clone(),
            self.index_store.clone(),
            embedder,
            options,
        )
    }
}
