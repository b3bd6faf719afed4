//! Query engine: text → embedding → k-NN → ranked metadata rows.
//!
//! Read-only against an already loaded index, so one engine and one snapshot
//! can serve any number of concurrent queries.

use std::sync::Arc;

use newsdex_types::error::{EmbeddingError, IndexError};
use newsdex_types::index::{IndexMetadataEntry, ScoredResult};

use crate::embedding::BoxEmbedder;
use crate::index::VectorIndex;
use crate::repository::index::IndexSnapshot;

pub struct QueryEngine {
    embedder: Arc<BoxEmbedder>,
}

impl QueryEngine {
    pub fn new(embedder: Arc<BoxEmbedder>) -> Self {
        Self { embedder }
    }

    /// Rank the `k` rows of `index` nearest to `text`.
    ///
    /// Blank text is rejected before the provider is called. A query vector
    /// whose dimension differs from the index surfaces as
    /// `DimensionMismatch`: the index was built by a different model.
    pub async fn query<I: VectorIndex + ?Sized>(
        &self,
        text: &str,
        k: usize,
        index: &I,
        metadata: &[IndexMetadataEntry],
    ) -> Result<Vec<ScoredResult>, IndexError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IndexError::InvalidQuery);
        }

        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::BatchSize {
                expected: 1,
                actual: vectors.len(),
            }
            .into());
        }
        let query_vector = vectors.remove(0);

        let neighbors = index.search(&query_vector, k)?;
        tracing::debug!(k, hits = neighbors.len(), "query answered");

        neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| {
                let entry = metadata.get(neighbor.row).cloned().ok_or_else(|| {
                    IndexError::CorruptState(format!(
                        "row {} has no metadata ({} entries)",
                        neighbor.row,
                        metadata.len()
                    ))
                })?;
                Ok(ScoredResult {
                    entry,
                    distance: neighbor.distance,
                    rank: i + 1,
                })
            })
            .collect()
    }

    /// Query a loaded snapshot.
    pub async fn search(
        &self,
        snapshot: &IndexSnapshot,
        text: &str,
        k: usize,
    ) -> Result<Vec<ScoredResult>, IndexError> {
        self.query(text, k, &snapshot.index, &snapshot.metadata).await
    }
}
