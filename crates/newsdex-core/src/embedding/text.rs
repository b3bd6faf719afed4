//! Text preparation and batched embedding of documents.

use newsdex_types::document::Document;
use newsdex_types::error::EmbeddingError;

use super::box_embedder::BoxEmbedder;

/// Characters of body text folded into the embedding input by default.
pub const DEFAULT_BODY_PREFIX_CHARS: usize = 1000;

/// Texts per provider call by default.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Knobs for turning documents into provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub body_prefix_chars: usize,
    pub batch_size: usize,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            body_prefix_chars: DEFAULT_BODY_PREFIX_CHARS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Build the embedding input for a document.
///
/// Headline, bounded body prefix, then source, space-joined. Empty fields are
/// skipped. The prefix is counted in characters, not bytes.
pub fn prepare_text(document: &Document, body_prefix_chars: usize) -> String {
    let mut parts = Vec::with_capacity(3);

    if !document.headline.is_empty() {
        parts.push(format!("Headline: {}", document.headline));
    }

    if !document.body_text.is_empty() {
        let prefix: String = document.body_text.chars().take(body_prefix_chars).collect();
        parts.push(format!("Content: {prefix}"));
    }

    if !document.source.is_empty() {
        parts.push(format!("Source: {}", document.source));
    }

    parts.join(" ")
}

/// Embed every document in order, `batch_size` texts per provider call.
///
/// Fails fast on the first provider error. A provider that returns the wrong
/// number of vectors for a batch is treated as an error, so the output always
/// has exactly one vector per input document.
pub async fn embed_all(
    embedder: &BoxEmbedder,
    documents: &[&Document],
    options: &EmbedOptions,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let texts: Vec<String> = documents
        .iter()
        .map(|d| prepare_text(d, options.body_prefix_chars))
        .collect();

    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(options.batch_size.max(1)) {
        let embedded = embedder.embed(batch).await?;
        if embedded.len() != batch.len() {
            return Err(EmbeddingError::BatchSize {
                expected: batch.len(),
                actual: embedded.len(),
            });
        }
        tracing::debug!(
            batch = batch.len(),
            done = vectors.len() + embedded.len(),
            total = texts.len(),
            "embedded batch"
        );
        vectors.extend(embedded);
    }

    Ok(vectors)
}
