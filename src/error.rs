//! Error types for quill-memory

use thiserror::Error;

/// Result type alias for quill-memory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quill-memory
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tier mismatch: {0}")]
    TierMismatch(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Vault write error: {0}")]
    VaultWrite(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn tier_mismatch(msg: impl Into<String>) -> Self {
        Self::TierMismatch(msg.into())
    }

    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }

    pub fn vector_store(msg: impl Into<String>) -> Self {
        Self::VectorStore(msg.into())
    }

    pub fn vault_write(msg: impl Into<String>) -> Self {
        Self::VaultWrite(msg.into())
    }
}
