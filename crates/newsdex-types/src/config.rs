//! Global configuration types for Newsdex.
//!
//! `NewsdexConfig` represents the top-level `config.toml` that selects the
//! embedding model and tunes text preparation, batching, and query defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.newsdex/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsdexConfig {
    /// Embedding model name (e.g., "all-MiniLM-L6-v2").
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Number of results returned when a query does not ask for a specific k.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Number of texts sent to the embedding provider per call.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    /// Characters of body text included in the embedding input.
    #[serde(default = "default_body_prefix_chars")]
    pub body_prefix_chars: usize,

    /// Characters of body text kept as the result preview.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Reuse vectors from the previous index generation when rebuilding.
    #[serde(default)]
    pub reuse_embeddings: bool,
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_body_prefix_chars() -> usize {
    1000
}

fn default_preview_chars() -> usize {
    200
}

impl Default for NewsdexConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            default_top_k: default_top_k(),
            embed_batch_size: default_embed_batch_size(),
            body_prefix_chars: default_body_prefix_chars(),
            preview_chars: default_preview_chars(),
            reuse_embeddings: false,
        }
    }
}
