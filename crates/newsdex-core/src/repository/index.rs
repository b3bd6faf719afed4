//! IndexStore trait definition and the snapshot it persists.

use newsdex_types::error::IndexError;
use newsdex_types::index::{IndexDescriptor, IndexMetadataEntry};

use crate::index::{FlatIndex, VectorIndex};

/// One index generation: vectors, row-aligned metadata, and descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub index: FlatIndex,
    pub metadata: Vec<IndexMetadataEntry>,
    pub descriptor: IndexDescriptor,
}

impl IndexSnapshot {
    /// Check that metadata and descriptor agree with the index rows.
    ///
    /// Run before every save and after every load; a snapshot that fails
    /// here must never be served.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.metadata.len() != self.index.len() {
            return Err(IndexError::CorruptState(format!(
                "{} metadata entries for {} index rows",
                self.metadata.len(),
                self.index.len()
            )));
        }
        if self.descriptor.document_count != self.index.len() {
            return Err(IndexError::CorruptState(format!(
                "descriptor records {} documents, index holds {}",
                self.descriptor.document_count,
                self.index.len()
            )));
        }
        if !self.index.is_empty() && self.descriptor.embedding_dim != self.index.dimension() {
            return Err(IndexError::CorruptState(format!(
                "descriptor records dimension {}, index has {}",
                self.descriptor.embedding_dim,
                self.index.dimension()
            )));
        }
        Ok(())
    }
}

/// Atomic persistence of index generations.
///
/// Implementations live in newsdex-infra (e.g., `FileIndexStore`).
pub trait IndexStore: Send + Sync {
    /// Persist a snapshot as the new live generation.
    ///
    /// Either the whole snapshot becomes visible or none of it does; on
    /// failure the previous generation stays live.
    fn save(
        &self,
        snapshot: &IndexSnapshot,
    ) -> impl std::future::Future<Output = Result<(), IndexError>> + Send;

    /// Load the live generation, re-checking row alignment.
    fn load(&self) -> impl std::future::Future<Output = Result<IndexSnapshot, IndexError>> + Send;

    /// Whether a live generation exists.
    fn exists(&self) -> impl std::future::Future<Output = bool> + Send;
}
