//! Ingestion service: the single owner of merge-and-append.
//!
//! `merge` itself is pure, but load → merge → append → save is a
//! read-modify-write on the corpus. The service serializes that sequence
//! behind an async mutex so concurrent batches cannot both accept the same
//! headline or clobber each other's appends.

use newsdex_types::document::{Document, RawDocument};
use newsdex_types::error::StoreError;
use tokio::sync::Mutex;

use crate::repository::document::DocumentStore;

use super::merge;

/// Outcome of one ingested batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents in the incoming batch.
    pub fetched: usize,
    /// Documents that were new and are now stored, with their ids.
    pub accepted: Vec<Document>,
    /// Corpus size after the batch.
    pub corpus_size: usize,
}

/// Serializes ingestion against one document store.
pub struct IngestService<D: DocumentStore> {
    store: D,
    lock: Mutex<()>,
}

impl<D: DocumentStore> IngestService<D> {
    pub fn new(store: D) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Access the underlying document store.
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Merge a fetched batch into the persisted corpus.
    ///
    /// The corpus is rewritten only when at least one document is accepted.
    pub async fn ingest(&self, incoming: Vec<RawDocument>) -> Result<IngestReport, StoreError> {
        let _guard = self.lock.lock().await;

        let mut corpus = self.store.load().await?;
        let fetched = incoming.len();
        let unique = merge(&corpus, incoming);

        if unique.is_empty() {
            tracing::info!(fetched, corpus_size = corpus.len(), "no new documents");
            return Ok(IngestReport {
                fetched,
                accepted: Vec::new(),
                corpus_size: corpus.len(),
            });
        }

        let accepted = corpus.append(unique)?.to_vec();
        self.store.save(&corpus).await?;

        tracing::info!(
            fetched,
            accepted = accepted.len(),
            corpus_size = corpus.len(),
            "ingested batch"
        );

        Ok(IngestReport {
            fetched,
            accepted,
            corpus_size: corpus.len(),
        })
    }
}
