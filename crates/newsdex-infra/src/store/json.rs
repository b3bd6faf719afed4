//! JSON file implementation of `DocumentStore`.
//!
//! The corpus is a single pretty-printed JSON array at
//! `{data_dir}/news_data.json`. Records written before ids existed are
//! accepted and given ids on load, after the highest id already present.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use newsdex_core::repository::document::DocumentStore;
use newsdex_types::document::{Corpus, Document, RawDocument};
use newsdex_types::error::StoreError;
use serde::Deserialize;

use crate::filesystem::write_atomic;

/// On-disk record: a raw document plus an optional id.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    id: Option<u64>,
    #[serde(flatten)]
    raw: RawDocument,
}

/// Corpus store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    path: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonDocumentStore {
    async fn load(&self) -> Result<Corpus, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no corpus file yet");
                return Ok(Corpus::new());
            }
            Err(err) => {
                return Err(StoreError::Io(format!("{}: {err}", self.path.display())));
            }
        };

        let stored: Vec<StoredDocument> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Malformed(format!("{}: {e}", self.path.display())))?;

        let corpus = assign_ids(stored)?;

        let distinct = corpus.dedup_keys().len();
        if distinct < corpus.len() {
            tracing::warn!(
                path = %self.path.display(),
                duplicates = corpus.len() - distinct,
                "corpus contains headlines that normalize to the same key"
            );
        }

        Ok(corpus)
    }

    async fn save(&self, corpus: &Corpus) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(corpus.documents())
            .map_err(|e| StoreError::Io(format!("failed to serialize corpus: {e}")))?;
        write_atomic(&self.path, &json)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), documents = corpus.len(), "saved corpus");
        Ok(())
    }
}

/// Keep explicit ids, number id-less records after the current maximum.
fn assign_ids(stored: Vec<StoredDocument>) -> Result<Corpus, StoreError> {
    let mut seen = HashSet::new();
    for id in stored.iter().filter_map(|s| s.id) {
        if !seen.insert(id) {
            return Err(StoreError::Malformed(format!("duplicate document id {id}")));
        }
    }

    let mut next_id = match seen.iter().max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    };
    let mut documents = Vec::with_capacity(stored.len());
    for record in stored {
        let id = match record.id {
            Some(id) => id,
            None => {
                let id = next_id.ok_or_else(|| {
                    StoreError::Malformed("no document id left for records without one".to_string())
                })?;
                next_id = id.checked_add(1);
                id
            }
        };
        documents.push(Document::from_raw(id, record.raw));
    }

    Ok(Corpus::from_documents(documents))
}

/// Read a fetcher batch: a JSON array of raw documents.
pub async fn read_batch(path: &Path) -> Result<Vec<RawDocument>, StoreError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Malformed(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn raw(headline: &str) -> RawDocument {
        RawDocument {
            headline: headline.to_string(),
            source_url: format!("https://news.example/{}", headline.len()),
            published_time: "1 hour ago".to_string(),
            source: "BBC".to_string(),
            body_text: format!("Full story of {headline}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_corpus() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(tmp.path().join("news_data.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order_and_ids() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(tmp.path().join("news_data.json"));

        let mut corpus = Corpus::new();
        corpus.append(vec![raw("First"), raw("Second"), raw("Third")]).unwrap();
        store.save(&corpus).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, corpus);
        let headlines: Vec<&str> = loaded.documents().iter().map(|d| d.headline.as_str()).collect();
        assert_eq!(headlines, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_saved_file_uses_full_news_field() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        let store = JsonDocumentStore::new(&path);

        let mut corpus = Corpus::new();
        corpus.append(vec![raw("Only")]).unwrap();
        store.save(&corpus).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(value[0]["full_news"], "Full story of Only");
        assert_eq!(value[0]["id"], 0);
    }

    #[tokio::test]
    async fn test_legacy_records_get_ids_after_max() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(
            &path,
            r#"[
                {"headline": "Legacy one", "full_news": "a"},
                {"id": 7, "headline": "Has id"},
                {"headline": "Legacy two", "source": "CNN"}
            ]"#,
        )
        .await
        .unwrap();

        let corpus = JsonDocumentStore::new(&path).load().await.unwrap();
        let ids: Vec<u64> = corpus.documents().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![8, 7, 9]);
        assert_eq!(corpus.next_id(), Some(10));
        assert_eq!(corpus.documents()[0].body_text, "a");
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonDocumentStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(
            &path,
            r#"[{"id": 1, "headline": "a"}, {"id": 1, "headline": "b"}]"#,
        )
        .await
        .unwrap();

        let err = JsonDocumentStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_legacy_record_after_largest_id_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(
            &path,
            r#"[{"id": 18446744073709551615, "headline": "a"}, {"headline": "b"}]"#,
        )
        .await
        .unwrap();

        let err = JsonDocumentStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_largest_id_alone_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("news_data.json");
        tokio::fs::write(&path, r#"[{"id": 18446744073709551615, "headline": "a"}]"#)
            .await
            .unwrap();

        let corpus = JsonDocumentStore::new(&path).load().await.unwrap();
        assert_eq!(corpus.documents()[0].id, u64::MAX);
        assert_eq!(corpus.next_id(), None);
    }

    #[tokio::test]
    async fn test_read_batch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("batch.json");
        tokio::fs::write(
            &path,
            r#"[{"headline": "Fresh", "source_url": "https://x", "full_news": "body"}]"#,
        )
        .await
        .unwrap();

        let batch = read_batch(&path).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].headline, "Fresh");
        assert_eq!(batch[0].body_text, "body");
        assert!(batch[0].source.is_empty());
    }
}
