//! Deterministic stand-ins for the ports, shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use newsdex_types::document::{Corpus, Document, RawDocument};
use newsdex_types::error::{EmbeddingError, IndexError, StoreError};

use crate::embedding::Embedder;
use crate::repository::document::DocumentStore;
use crate::repository::index::{IndexSnapshot, IndexStore};

pub(crate) fn raw(headline: &str, source: &str, body: &str) -> RawDocument {
    RawDocument {
        headline: headline.to_string(),
        source_url: format!("https://news.example/{}", headline.len()),
        published_time: "2025-01-01T00:00:00Z".to_string(),
        source: source.to_string(),
        body_text: body.to_string(),
    }
}

pub(crate) fn corpus_of(headlines: &[&str]) -> Corpus {
    let mut corpus = Corpus::new();
    corpus
        .append(
            headlines
                .iter()
                .map(|h| raw(h, "CNN", &format!("Body of {h}")))
                .collect(),
        )
        .unwrap();
    corpus
}

/// Embedder returning fixed vectors for known texts and a byte-derived vector
/// otherwise. Counts calls and embedded texts.
#[derive(Clone)]
pub(crate) struct StubEmbedder {
    dimension: usize,
    fixed: HashMap<String, Vec<f32>>,
    fail_when_contains: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub texts_embedded: Arc<AtomicUsize>,
}

impl StubEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fixed: HashMap::new(),
            fail_when_contains: None,
            calls: Arc::new(AtomicUsize::new(0)),
            texts_embedded: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.fixed.insert(text.to_string(), vector);
        self
    }

    pub(crate) fn failing_when_contains(mut self, needle: &str) -> Self {
        self.fail_when_contains = Some(needle.to_string());
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn texts_count(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.fixed.get(text) {
            return v.clone();
        }
        let mut v = vec![0.0_f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            v[i % self.dimension] += f32::from(byte) / 255.0;
        }
        v
    }
}

impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_when_contains {
            if texts.iter().any(|t| t.contains(needle.as_str())) {
                return Err(EmbeddingError::Runtime(format!("refused text containing '{needle}'")));
            }
        }
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Default)]
pub(crate) struct MemoryDocumentStore {
    corpus: Mutex<Corpus>,
    pub saves: AtomicUsize,
}

impl MemoryDocumentStore {
    pub(crate) fn with_corpus(corpus: Corpus) -> Self {
        Self {
            corpus: Mutex::new(corpus),
            saves: AtomicUsize::new(0),
        }
    }

    pub(crate) fn documents(&self) -> Vec<Document> {
        self.corpus.lock().unwrap().documents().to_vec()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn load(&self) -> Result<Corpus, StoreError> {
        Ok(self.corpus.lock().unwrap().clone())
    }

    async fn save(&self, corpus: &Corpus) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.corpus.lock().unwrap() = corpus.clone();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryIndexStore {
    snapshot: Mutex<Option<IndexSnapshot>>,
    fail_saves: bool,
    pub saves: AtomicUsize,
}

impl MemoryIndexStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_snapshot(snapshot: IndexSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub(crate) fn current(&self) -> Option<IndexSnapshot> {
        self.snapshot.lock().unwrap().clone()
    }
}

impl IndexStore for MemoryIndexStore {
    async fn save(&self, snapshot: &IndexSnapshot) -> Result<(), IndexError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(IndexError::Persistence("disk full".to_string()));
        }
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<IndexSnapshot, IndexError> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IndexError::NotFound("no index saved".to_string()))
    }

    async fn exists(&self) -> bool {
        self.snapshot.lock().unwrap().is_some()
    }
}
