//! Embedding provider port, text preparation, and the per-document
//! embedding cache.

pub mod box_embedder;
pub mod cache;
pub mod embedder;
pub mod text;

pub use box_embedder::BoxEmbedder;
pub use cache::EmbeddingCache;
pub use embedder::Embedder;
pub use text::{embed_all, prepare_text, EmbedOptions};
