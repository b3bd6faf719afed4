//! Vectors from a previous index generation, reusable by the next build.
//!
//! A cached vector stands in for a corpus document only when the document
//! still looks like the article it was computed for: same id, same
//! normalized headline, same source URL. A corpus that was reset or replaced
//! while an old index survived can hand out the same ids to different
//! articles, and those must go back to the provider.

use std::collections::HashMap;

use newsdex_types::document::{DedupKey, Document};

use crate::repository::index::IndexSnapshot;

#[derive(Debug, Clone, PartialEq)]
struct CachedVector {
    key: DedupKey,
    source_url: String,
    vector: Vec<f32>,
}

/// Vectors from one model, by document id.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingCache {
    model_identity: String,
    dimension: usize,
    vectors: HashMap<u64, CachedVector>,
}

impl EmbeddingCache {
    /// Recover the vectors of a persisted generation via its row alignment.
    pub fn from_snapshot(snapshot: &IndexSnapshot) -> Self {
        let mut vectors = HashMap::with_capacity(snapshot.metadata.len());
        for (row, entry) in snapshot.metadata.iter().enumerate() {
            if let Some(vector) = snapshot.index.row(row) {
                vectors.insert(
                    entry.document_id,
                    CachedVector {
                        key: DedupKey::from_headline(&entry.headline),
                        source_url: entry.source_url.clone(),
                        vector: vector.to_vec(),
                    },
                );
            }
        }

        Self {
            model_identity: snapshot.descriptor.model_identity.clone(),
            dimension: snapshot.descriptor.embedding_dim,
            vectors,
        }
    }

    /// Whether vectors in this cache can stand in for `model_identity` output.
    pub fn is_compatible(&self, model_identity: &str, dimension: usize) -> bool {
        self.model_identity == model_identity && self.dimension == dimension
    }

    /// The cached vector for `document`, if it was computed for this article.
    pub fn get(&self, document: &Document) -> Option<&[f32]> {
        self.vectors
            .get(&document.id)
            .filter(|cached| cached.key == document.dedup_key() && cached.source_url == document.source_url)
            .map(|cached| cached.vector.as_slice())
    }

    pub fn model_identity(&self) -> &str {
        &self.model_identity
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
