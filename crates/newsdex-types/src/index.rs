//! Index-facing types: row-aligned metadata, neighbors, search results,
//! and the descriptor persisted next to every index generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Label written for documents that carry no source.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Characters of body text kept in a metadata preview by default.
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Index type label for the exact L2 flat index.
pub const FLAT_L2_INDEX_TYPE: &str = "flat_l2";

/// A single k-NN hit: index row and squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// Display projection of a document, stored at the same position as its
/// embedding row.
///
/// `metadata[i]` describes the document embedded at index row `i`. Nothing
/// else links the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadataEntry {
    pub document_id: u64,
    pub headline: String,
    pub source_url: String,
    pub published_time: String,
    pub source: String,
    /// Leading slice of the body, suffixed with `...` when the body is non-empty.
    pub preview: String,
}

impl IndexMetadataEntry {
    /// Project a document into a metadata row with a `preview_chars`-long body preview.
    pub fn from_document(document: &Document, preview_chars: usize) -> Self {
        let preview = if document.body_text.is_empty() {
            String::new()
        } else {
            let head: String = document.body_text.chars().take(preview_chars).collect();
            format!("{head}...")
        };

        let source = if document.source.is_empty() {
            UNKNOWN_SOURCE.to_string()
        } else {
            document.source.clone()
        };

        Self {
            document_id: document.id,
            headline: document.headline.clone(),
            source_url: document.source_url.clone(),
            published_time: document.published_time.clone(),
            source,
            preview,
        }
    }
}

/// A ranked query hit: the metadata row plus its distance and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub entry: IndexMetadataEntry,
    pub distance: f32,
    pub rank: usize,
}

/// Human-inspectable description of an index generation.
///
/// Not needed to answer queries, but the first thing to look at when a query
/// reports a dimension mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub created_at: DateTime<Utc>,
    pub document_count: usize,
    pub embedding_dim: usize,
    pub index_type: String,
    pub model_identity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str, source: &str) -> Document {
        Document {
            id: 3,
            headline: "Rains flood the city".to_string(),
            source_url: "https://example.com/rains".to_string(),
            published_time: "2 hours ago".to_string(),
            source: source.to_string(),
            body_text: body.to_string(),
        }
    }

    #[test]
    fn test_metadata_preview_truncates_and_marks() {
        let entry = IndexMetadataEntry::from_document(&document("abcdefghij", "CNN"), 4);
        assert_eq!(entry.preview, "abcd...");
        assert_eq!(entry.document_id, 3);
        assert_eq!(entry.source, "CNN");
    }

    #[test]
    fn test_metadata_preview_short_body_still_marked() {
        let entry = IndexMetadataEntry::from_document(&document("short", "CNN"), 200);
        assert_eq!(entry.preview, "short...");
    }

    #[test]
    fn test_metadata_empty_body_and_source() {
        let entry = IndexMetadataEntry::from_document(&document("", ""), 200);
        assert!(entry.preview.is_empty());
        assert_eq!(entry.source, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_metadata_preview_respects_char_boundaries() {
        let entry = IndexMetadataEntry::from_document(&document("ঢাকায় বৃষ্টি", "Daily Star"), 3);
        assert_eq!(entry.preview.chars().count(), 6);
    }

    #[test]
    fn test_scored_result_flattens_entry() {
        let result = ScoredResult {
            entry: IndexMetadataEntry::from_document(&document("body", "CNN"), 200),
            distance: 0.5,
            rank: 1,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["headline"], "Rains flood the city");
        assert_eq!(json["rank"], 1);
    }
}
