//! Persistent stores: the JSON corpus file and the generation-swapped index.

pub mod codec;
pub mod index;
pub mod json;

pub use index::FileIndexStore;
pub use json::{read_batch, JsonDocumentStore};
