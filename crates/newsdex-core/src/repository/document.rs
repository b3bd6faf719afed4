//! DocumentStore trait definition.
//!
//! The store persists the whole corpus as one unit. It is append-only by
//! contract: callers load, append merge output, and save.

use newsdex_types::document::Corpus;
use newsdex_types::error::StoreError;

/// Durable home of the corpus.
///
/// Implementations live in newsdex-infra (e.g., `JsonDocumentStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait DocumentStore: Send + Sync {
    /// Load the full corpus. A store that has never been written yields an
    /// empty corpus.
    fn load(&self) -> impl std::future::Future<Output = Result<Corpus, StoreError>> + Send;

    /// Replace the persisted corpus with `corpus`.
    fn save(
        &self,
        corpus: &Corpus,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
