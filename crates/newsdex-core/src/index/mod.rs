//! Nearest-neighbor index abstraction.
//!
//! The query engine only sees [`VectorIndex`]; [`FlatIndex`] is the exact
//! linear-scan implementation. An approximate structure can be slotted in
//! behind the same trait.

pub mod flat;

use newsdex_types::error::IndexError;
use newsdex_types::index::Neighbor;

pub use flat::FlatIndex;

/// Read-only k-NN capability over a fixed set of row-indexed vectors.
pub trait VectorIndex: Send + Sync {
    /// Short label persisted in the index descriptor (e.g., "flat_l2").
    fn index_type(&self) -> &'static str;

    /// Dimension shared by every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` rows closest to `query`, nearest first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError>;
}
