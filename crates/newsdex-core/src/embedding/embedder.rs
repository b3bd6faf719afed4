//! The embedding provider seam.
//!
//! Index builds and queries both turn article text into vectors through this
//! trait. The fastembed-backed provider is in newsdex-infra; tests use a
//! deterministic stub.

use newsdex_types::error::EmbeddingError;

/// Maps prepared article or query text to fixed-width vectors.
///
/// A provider must return vectors of `dimension()` floats, and must keep
/// returning the same vector for the same text while `model_name()` stays
/// the same: reused index rows depend on it.
pub trait Embedder: Send + Sync {
    /// One vector per entry of `texts`, in the same order. A batch either
    /// fully succeeds or fails as a whole.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Written to each generation's descriptor; a mismatch with the live
    /// index disables vector reuse.
    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;
}
