//! Collaborator interfaces
//!
//! The substrate never owns stored bytes or embeddings; it talks to the
//! vector store and vault writer through these traits. Handles are injected
//! explicitly so tests can substitute fakes without shared state.

pub mod vault;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;
use crate::identity::DocumentId;

pub use vault::FsVaultWriter;

/// A similarity-search hit from the vector store
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// The stored document
    pub document: Document,

    /// Cosine distance to the query, in [0, 2], ascending order
    pub distance: f64,
}

/// The vector-store collaborator
///
/// Owns the persisted documents and their embeddings. Assumed to serialize
/// concurrent upserts and deletes on the same identifier.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace documents
    async fn upsert(&self, documents: Vec<Document>) -> Result<()>;

    /// Fetch a document by identifier
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Similarity-search the corpus, ranked by ascending distance
    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<QueryHit>>;

    /// Delete documents by identifier
    async fn delete(&self, ids: &[DocumentId]) -> Result<()>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;
}

/// The vault-write collaborator
///
/// Writes durable files relative to a sandboxed root; the sandbox itself
/// lives outside this crate.
#[async_trait]
pub trait VaultWriter: Send + Sync {
    /// Whether a file already exists at the relative path
    async fn exists(&self, relative_path: &str) -> Result<bool>;

    /// Write a file at the relative path, creating parent directories
    async fn write(&self, relative_path: &str, content: &str) -> Result<()>;
}

/// A secret detected in content headed for storage
#[derive(Debug, Clone)]
pub struct SecretDetection {
    /// Name of the matched pattern (aws-key, private-key, ...)
    pub pattern: String,

    /// Byte offset of the match
    pub offset: usize,
}

/// The secret-scan collaborator
///
/// Callers gate writes on this before content reaches the substrate; the
/// substrate does not scan again.
pub trait SecretScanner: Send + Sync {
    /// Scan content, returning every detection
    fn scan(&self, content: &str) -> Vec<SecretDetection>;
}
