//! Ingestion: headline-based merge of fetched batches into the corpus.

pub mod service;

use newsdex_types::document::{Corpus, RawDocument};

pub use service::{IngestReport, IngestService};

/// Select the documents of `incoming` whose dedup key is new.
///
/// A key counts as seen once it is in `existing` or has already been accepted
/// from this batch, so the first occurrence of a repeated headline wins.
/// Order follows `incoming`. Pure: the caller appends the result.
pub fn merge(existing: &Corpus, incoming: Vec<RawDocument>) -> Vec<RawDocument> {
    let mut seen = existing.dedup_keys();
    incoming
        .into_iter()
        .filter(|doc| seen.insert(doc.dedup_key()))
        .collect()
}
