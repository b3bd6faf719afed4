//! Document types for Newsdex.
//!
//! A `RawDocument` is what a fetcher hands us; a `Document` is the canonical,
//! id-bearing record owned by the document store. The corpus is the ordered,
//! append-only collection of documents and doubles as the dedup universe.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A document record as produced by a content fetcher, before ingestion.
///
/// Only `headline` is required on the wire; every other field defaults to an
/// empty string. The body travels as `full_news` to stay compatible with
/// existing corpus files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub headline: String,
    #[serde(default)]
    pub source_url: String,
    /// Source-provided publication time. Opaque, never parsed.
    #[serde(default)]
    pub published_time: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "full_news", default)]
    pub body_text: String,
}

impl RawDocument {
    /// Normalized headline used for ingestion dedup.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::from_headline(&self.headline)
    }
}

/// A canonical document stored in the corpus.
///
/// Immutable once stored. `id` is assigned at ingestion and increases
/// monotonically in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub headline: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub published_time: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "full_news", default)]
    pub body_text: String,
}

impl Document {
    /// Attach an id to a raw document.
    pub fn from_raw(id: u64, raw: RawDocument) -> Self {
        Self {
            id,
            headline: raw.headline,
            source_url: raw.source_url,
            published_time: raw.published_time,
            source: raw.source,
            body_text: raw.body_text,
        }
    }

    /// Normalized headline used for ingestion dedup.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::from_headline(&self.headline)
    }
}

/// Normalized headline: Unicode lowercase with whitespace runs collapsed.
///
/// Two documents with the same key are considered the same article, whatever
/// their URL or body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn from_headline(headline: &str) -> Self {
        let folded = headline.to_lowercase();
        Self(folded.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, append-only collection of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-identified documents, preserving their order.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The id the next appended document will receive, or `None` once the
    /// id space is used up.
    pub fn next_id(&self) -> Option<u64> {
        match self.documents.iter().map(|d| d.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        }
    }

    /// Dedup keys of every stored document.
    pub fn dedup_keys(&self) -> HashSet<DedupKey> {
        self.documents.iter().map(Document::dedup_key).collect()
    }

    /// Append merge output, assigning fresh ids in order.
    ///
    /// Callers pass the result of `merge`, which guarantees none of the
    /// incoming keys already exist here. Returns the newly stored documents.
    /// Nothing is appended if the batch would run past the largest id.
    pub fn append(&mut self, accepted: Vec<RawDocument>) -> Result<&[Document], StoreError> {
        let start = self.documents.len();
        let mut next_id = self.next_id();
        let mut assigned = Vec::with_capacity(accepted.len());
        for raw in accepted {
            let id = next_id.ok_or_else(|| StoreError::Malformed("document ids exhausted".to_string()))?;
            assigned.push(Document::from_raw(id, raw));
            next_id = id.checked_add(1);
        }
        self.documents.extend(assigned);
        Ok(&self.documents[start..])
    }
}
