//! Index builder: corpus → embeddings → flat index → persisted generation.
//!
//! A build walks `Empty → Loading → Embedding → Building → Persisted` in
//! order and stops at the first failure. Every build re-derives the whole
//! index from the current corpus snapshot, so metadata row `i` always
//! describes the document embedded at row `i`. With embedding reuse enabled,
//! vectors from the previous generation stand in for documents it already
//! covered; only new documents reach the provider.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use newsdex_types::config::NewsdexConfig;
use newsdex_types::document::{Corpus, Document};
use newsdex_types::error::IndexError;
use newsdex_types::index::{IndexDescriptor, IndexMetadataEntry, DEFAULT_PREVIEW_CHARS};

use crate::embedding::{embed_all, BoxEmbedder, EmbedOptions, EmbeddingCache};
use crate::index::{FlatIndex, VectorIndex};
use crate::repository::document::DocumentStore;
use crate::repository::index::{IndexSnapshot, IndexStore};

/// Stage of an index build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Empty,
    Loading,
    Embedding,
    Building,
    Persisted,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Empty => write!(f, "empty"),
            BuildState::Loading => write!(f, "loading"),
            BuildState::Embedding => write!(f, "embedding"),
            BuildState::Building => write!(f, "building"),
            BuildState::Persisted => write!(f, "persisted"),
        }
    }
}

/// Build tuning, usually taken from `NewsdexConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub embed: EmbedOptions,
    pub preview_chars: usize,
    pub reuse_embeddings: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            embed: EmbedOptions::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            reuse_embeddings: false,
        }
    }
}

impl From<&NewsdexConfig> for BuildOptions {
    fn from(config: &NewsdexConfig) -> Self {
        Self {
            embed: EmbedOptions {
                body_prefix_chars: config.body_prefix_chars,
                batch_size: config.embed_batch_size,
            },
            preview_chars: config.preview_chars,
            reuse_embeddings: config.reuse_embeddings,
        }
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub descriptor: IndexDescriptor,
    /// Documents sent to the embedding provider.
    pub embedded: usize,
    /// Documents whose vector came from the previous generation.
    pub reused: usize,
}

/// Orchestrates a full index build.
///
/// Generic over the document and index stores; the embedding provider is
/// passed in explicitly.
pub struct IndexBuilder<D: DocumentStore, S: IndexStore> {
    documents: D,
    index_store: S,
    embedder: Arc<BoxEmbedder>,
    options: BuildOptions,
    state: Mutex<BuildState>,
}

impl<D: DocumentStore, S: IndexStore> IndexBuilder<D, S> {
    pub fn new(documents: D, index_store: S, embedder: Arc<BoxEmbedder>, options: BuildOptions) -> Self {
        Self {
            documents,
            index_store,
            embedder,
            options,
            state: Mutex::new(BuildState::Empty),
        }
    }

    /// The stage the most recent build reached.
    pub fn state(&self) -> BuildState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn index_store(&self) -> &S {
        &self.index_store
    }

    fn transition(&self, next: BuildState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(from = %*state, to = %next, "index build");
        *state = next;
    }

    /// Run a full build and persist the result as the live generation.
    ///
    /// Nothing is written unless every step succeeds.
    pub async fn build(&self) -> Result<BuildReport, IndexError> {
        self.transition(BuildState::Empty);

        self.transition(BuildState::Loading);
        let corpus = self.documents.load().await?;
        if corpus.is_empty() {
            tracing::warn!("corpus is empty, no index built");
            return Err(IndexError::EmptyCorpus);
        }

        self.transition(BuildState::Embedding);
        let cache = if self.options.reuse_embeddings {
            self.previous_embeddings().await
        } else {
            None
        };
        let (vectors, embedded, reused) = self.embed_corpus(&corpus, cache.as_ref()).await?;

        self.transition(BuildState::Building);
        let index = FlatIndex::build(vectors)?;
        let expected = self.embedder.dimension();
        if index.dimension() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: index.dimension(),
            });
        }

        let metadata: Vec<IndexMetadataEntry> = corpus
            .documents()
            .iter()
            .map(|d| IndexMetadataEntry::from_document(d, self.options.preview_chars))
            .collect();

        let descriptor = IndexDescriptor {
            created_at: Utc::now(),
            document_count: index.len(),
            embedding_dim: index.dimension(),
            index_type: index.index_type().to_string(),
            model_identity: self.embedder.model_name().to_string(),
        };

        let snapshot = IndexSnapshot {
            index,
            metadata,
            descriptor: descriptor.clone(),
        };
        snapshot.validate()?;
        self.index_store.save(&snapshot).await?;

        self.transition(BuildState::Persisted);
        tracing::info!(
            documents = descriptor.document_count,
            dimension = descriptor.embedding_dim,
            embedded,
            reused,
            "index persisted"
        );

        Ok(BuildReport {
            descriptor,
            embedded,
            reused,
        })
    }

    /// Vectors of the live generation, if it was built by the current model.
    async fn previous_embeddings(&self) -> Option<EmbeddingCache> {
        if !self.index_store.exists().await {
            tracing::debug!("no previous index, embedding all documents");
            return None;
        }
        match self.index_store.load().await {
            Ok(snapshot) => {
                let cache = EmbeddingCache::from_snapshot(&snapshot);
                if cache.is_compatible(self.embedder.model_name(), self.embedder.dimension()) {
                    Some(cache)
                } else {
                    tracing::warn!(
                        previous = cache.model_identity(),
                        current = self.embedder.model_name(),
                        "embedding model changed, re-embedding all documents"
                    );
                    None
                }
            }
            Err(IndexError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(error = %e, "previous index unreadable, re-embedding all documents");
                None
            }
        }
    }

    /// One vector per corpus document, in corpus order.
    async fn embed_corpus(
        &self,
        corpus: &Corpus,
        cache: Option<&EmbeddingCache>,
    ) -> Result<(Vec<Vec<f32>>, usize, usize), IndexError> {
        let mut slots: Vec<Option<Vec<f32>>> = Vec::with_capacity(corpus.len());
        let mut missing: Vec<&Document> = Vec::new();

        for document in corpus.documents() {
            match cache.and_then(|c| c.get(document)) {
                Some(vector) => slots.push(Some(vector.to_vec())),
                None => {
                    slots.push(None);
                    missing.push(document);
                }
            }
        }

        let reused = corpus.len() - missing.len();
        let fresh = embed_all(&self.embedder, &missing, &self.options.embed).await?;
        let embedded = fresh.len();
        let mut fresh = fresh.into_iter();

        let vectors = slots
            .into_iter()
            .map(|slot| match slot {
                Some(vector) => Ok(vector),
                None => fresh.next().ok_or_else(|| {
                    IndexError::EmbeddingProvider("provider returned too few vectors".to_string())
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((vectors, embedded, reused))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::prepare_text;
    use crate::testing::{corpus_of, MemoryDocumentStore, MemoryIndexStore, StubEmbedder};
    use newsdex_types::document::{Corpus, RawDocument};
    use std::sync::atomic::Ordering;

    fn builder(
        corpus: Corpus,
        index_store: MemoryIndexStore,
        stub: StubEmbedder,
        options: BuildOptions,
    ) -> IndexBuilder<MemoryDocumentStore, MemoryIndexStore> {
        IndexBuilder::new(
            MemoryDocumentStore::with_corpus(corpus),
            index_store,
            Arc::new(BoxEmbedder::new(stub)),
            options,
        )
    }

    #[tokio::test]
    async fn test_build_persists_aligned_snapshot() {
        let corpus = corpus_of(&["Alpha", "Beta", "Gamma"]);
        let stub = StubEmbedder::new(4);
        let builder = builder(corpus.clone(), MemoryIndexStore::default(), stub, BuildOptions::default());

        let report = builder.build().await.unwrap();
        assert_eq!(builder.state(), BuildState::Persisted);
        assert_eq!(report.descriptor.document_count, 3);
        assert_eq!(report.descriptor.embedding_dim, 4);
        assert_eq!(report.descriptor.model_identity, "stub-model");
        assert_eq!(report.embedded, 3);

        let snapshot = builder.index_store().current().unwrap();
        assert_eq!(snapshot.metadata.len(), snapshot.index.len());

        let reference = BoxEmbedder::new(StubEmbedder::new(4));
        for (row, document) in corpus.documents().iter().enumerate() {
            assert_eq!(snapshot.metadata[row].document_id, document.id);
            assert_eq!(snapshot.metadata[row].headline, document.headline);
            let expected = reference
                .embed(&[prepare_text(document, 1000)])
                .await
                .unwrap()
                .remove(0);
            assert_eq!(snapshot.index.row(row).unwrap(), expected.as_slice());
        }
    }

    #[tokio::test]
    async fn test_empty_corpus_fails_before_embedding() {
        let stub = StubEmbedder::new(4);
        let counter = stub.clone();
        let builder = builder(Corpus::new(), MemoryIndexStore::default(), stub, BuildOptions::default());

        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, IndexError::EmptyCorpus));
        assert_eq!(builder.state(), BuildState::Loading);
        assert_eq!(counter.call_count(), 0);
        assert_eq!(builder.index_store().saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_without_persisting() {
        let stub = StubEmbedder::new(4).failing_when_contains("Gamma");
        let builder = builder(
            corpus_of(&["Alpha", "Beta", "Gamma"]),
            MemoryIndexStore::default(),
            stub,
            BuildOptions::default(),
        );

        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, IndexError::EmbeddingProvider(_)));
        assert_eq!(builder.state(), BuildState::Embedding);
        assert!(builder.index_store().current().is_none());
    }

    #[tokio::test]
    async fn test_mixed_dimensions_abort_without_persisting() {
        let corpus = corpus_of(&["Alpha", "Beta"]);
        let odd_text = prepare_text(&corpus.documents()[1], 1000);
        let stub = StubEmbedder::new(4).with_vector(&odd_text, vec![1.0; 7]);
        let builder = builder(corpus, MemoryIndexStore::default(), stub, BuildOptions::default());

        let err = builder.build().await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 4,
                actual: 7
            }
        ));
        assert_eq!(builder.index_store().saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_surfaces() {
        let builder = builder(
            corpus_of(&["Alpha"]),
            MemoryIndexStore::failing(),
            StubEmbedder::new(4),
            BuildOptions::default(),
        );

        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, IndexError::Persistence(_)));
        assert_eq!(builder.state(), BuildState::Building);
    }

    #[tokio::test]
    async fn test_reuse_embeds_only_new_documents() {
        let mut corpus = corpus_of(&["Alpha", "Beta"]);
        let first = builder(
            corpus.clone(),
            MemoryIndexStore::default(),
            StubEmbedder::new(4),
            BuildOptions::default(),
        );
        first.build().await.unwrap();
        let previous = first.index_store().current().unwrap();

        corpus.append(vec![RawDocument {
            headline: "Delta".to_string(),
            source_url: String::new(),
            published_time: String::new(),
            source: "CNN".to_string(),
            body_text: String::new(),
        }])
        .unwrap();

        let stub = StubEmbedder::new(4);
        let counter = stub.clone();
        let options = BuildOptions {
            reuse_embeddings: true,
            ..BuildOptions::default()
        };
        let second = builder(corpus, MemoryIndexStore::with_snapshot(previous.clone()), stub, options);

        let report = second.build().await.unwrap();
        assert_eq!(report.reused, 2);
        assert_eq!(report.embedded, 1);
        assert_eq!(counter.texts_count(), 1);

        let snapshot = second.index_store().current().unwrap();
        assert_eq!(snapshot.index.len(), 3);
        assert_eq!(snapshot.index.row(0), previous.index.row(0));
        assert_eq!(snapshot.index.row(1), previous.index.row(1));
        assert_eq!(snapshot.metadata[2].headline, "Delta");
    }

    #[tokio::test]
    async fn test_reuse_skips_vectors_of_replaced_articles() {
        let first = builder(
            corpus_of(&["Alpha"]),
            MemoryIndexStore::default(),
            StubEmbedder::new(4),
            BuildOptions::default(),
        );
        first.build().await.unwrap();
        let previous = first.index_store().current().unwrap();

        // A fresh corpus hands id 0 to a different article.
        let corpus = corpus_of(&["Zeta completely different"]);
        assert_eq!(corpus.documents()[0].id, previous.metadata[0].document_id);

        let stub = StubEmbedder::new(4);
        let counter = stub.clone();
        let options = BuildOptions {
            reuse_embeddings: true,
            ..BuildOptions::default()
        };
        let second = builder(corpus.clone(), MemoryIndexStore::with_snapshot(previous), stub, options);

        let report = second.build().await.unwrap();
        assert_eq!(report.reused, 0);
        assert_eq!(report.embedded, 1);
        assert_eq!(counter.texts_count(), 1);

        let snapshot = second.index_store().current().unwrap();
        assert_eq!(snapshot.metadata[0].headline, "Zeta completely different");
        let expected = BoxEmbedder::new(StubEmbedder::new(4))
            .embed(&[prepare_text(&corpus.documents()[0], 1000)])
            .await
            .unwrap();
        assert_eq!(snapshot.index.row(0).unwrap(), expected[0].as_slice());
    }

    #[tokio::test]
    async fn test_reuse_ignores_cache_from_other_model() {
        let corpus = corpus_of(&["Alpha", "Beta"]);
        let first = builder(
            corpus.clone(),
            MemoryIndexStore::default(),
            StubEmbedder::new(4),
            BuildOptions::default(),
        );
        first.build().await.unwrap();
        let mut previous = first.index_store().current().unwrap();
        previous.descriptor.model_identity = "older-model".to_string();

        let stub = StubEmbedder::new(4);
        let counter = stub.clone();
        let options = BuildOptions {
            reuse_embeddings: true,
            ..BuildOptions::default()
        };
        let second = builder(corpus, MemoryIndexStore::with_snapshot(previous), stub, options);

        let report = second.build().await.unwrap();
        assert_eq!(report.reused, 0);
        assert_eq!(counter.texts_count(), 2);
    }

    #[tokio::test]
    async fn test_reuse_without_previous_index_embeds_everything() {
        let store = MemoryIndexStore::default();
        assert!(!store.exists().await);

        let stub = StubEmbedder::new(4);
        let counter = stub.clone();
        let options = BuildOptions {
            reuse_embeddings: true,
            ..BuildOptions::default()
        };
        let builder = builder(corpus_of(&["Alpha", "Beta"]), store, stub, options);

        let report = builder.build().await.unwrap();
        assert_eq!(report.reused, 0);
        assert_eq!(report.embedded, 2);
        assert_eq!(counter.texts_count(), 2);
        assert!(builder.index_store().exists().await);
    }

    #[test]
    fn test_options_from_config() {
        let config = NewsdexConfig {
            embed_batch_size: 8,
            body_prefix_chars: 500,
            preview_chars: 120,
            reuse_embeddings: true,
            ..NewsdexConfig::default()
        };
        let options = BuildOptions::from(&config);
        assert_eq!(options.embed.batch_size, 8);
        assert_eq!(options.embed.body_prefix_chars, 500);
        assert_eq!(options.preview_chars, 120);
        assert!(options.reuse_embeddings);
    }
}
