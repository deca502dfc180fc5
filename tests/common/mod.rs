//! Fake collaborators for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use quill_memory::{Document, DocumentId, Error, QueryHit, Result, VaultWriter, VectorStore};
use tokio::sync::Notify;

/// In-memory vector store with scripted distances
#[derive(Default)]
pub struct FakeVectorStore {
    docs: Mutex<HashMap<String, Document>>,
    distances: Mutex<HashMap<String, f64>>,
    pub upsert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with the distance every query reports for it
    pub fn seed(&self, doc: Document, distance: f64) {
        self.distances
            .lock()
            .unwrap()
            .insert(doc.id.as_str().to_string(), distance);
        self.docs
            .lock()
            .unwrap()
            .insert(doc.id.as_str().to_string(), doc);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.lock().unwrap().contains_key(id)
    }

    pub fn stored(&self, id: &str) -> Option<Document> {
        self.docs.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn upsert(&self, documents: Vec<Document>) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.lock().unwrap();
        for doc in documents {
            docs.insert(doc.id.as_str().to_string(), doc);
        }
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        Ok(self.docs.lock().unwrap().get(id.as_str()).cloned())
    }

    async fn query(&self, _query_text: &str, n_results: usize) -> Result<Vec<QueryHit>> {
        let distances = self.distances.lock().unwrap();
        let mut hits: Vec<QueryHit> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .map(|doc| QueryHit {
                document: doc.clone(),
                distance: distances.get(doc.id.as_str()).copied().unwrap_or(1.0),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    async fn delete(&self, ids: &[DocumentId]) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.lock().unwrap();
        for id in ids {
            docs.remove(id.as_str());
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.docs.lock().unwrap().len())
    }
}

/// In-memory vault writer that can be told to fail
#[derive(Default)]
pub struct FakeVaultWriter {
    files: Mutex<HashMap<String, String>>,
    pub fail_writes: AtomicBool,
    pub write_calls: AtomicUsize,
}

impl FakeVaultWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    /// Pre-create a file, as if an earlier promotion attempt wrote it
    pub fn preload(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }
}

#[async_trait]
impl VaultWriter for FakeVaultWriter {
    async fn exists(&self, relative_path: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(relative_path))
    }

    async fn write(&self, relative_path: &str, content: &str) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::vault_write("disk full"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), content.to_string());
        Ok(())
    }
}

/// Vault writer whose `write` parks until released, so tests can hold one
/// caller mid-write and interleave a second
#[derive(Default)]
pub struct GatedVaultWriter {
    inner: FakeVaultWriter,

    /// Signalled as soon as a caller enters `write`
    pub entered: Notify,

    /// `write` waits on this before the file lands
    pub release: Notify,
}

impl GatedVaultWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.inner.file(path)
    }
}

#[async_trait]
impl VaultWriter for GatedVaultWriter {
    async fn exists(&self, relative_path: &str) -> Result<bool> {
        self.inner.exists(relative_path).await
    }

    async fn write(&self, relative_path: &str, content: &str) -> Result<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.write(relative_path, content).await
    }
}
