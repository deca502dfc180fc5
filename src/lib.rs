//! # Quill Memory
//!
//! The tiered memory substrate of the Quill knowledge assistant.
//!
//! ## Architecture
//!
//! One address space spans two storage tiers:
//! - **Durable** - file-backed vault notes, human-visible
//! - **Ephemeral** - auto-generated index-only notes
//!
//! Five components share the data model:
//! - **Identity** - namespaced identifiers and tier classification
//! - **Chunker** - heading-aware splitting of long documents
//! - **Scorer** - 0.0-1.0 importance from content, type, recency, and usage
//! - **Promotion** - moves ephemeral documents into the durable vault
//! - **Retrieval** - assembles similarity hits under a character budget
//!
//! The vector index and the sandboxed vault are external collaborators,
//! consumed through the traits in [`store`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill_memory::{Config, FsVaultWriter, PromotionEngine, RetrievalAssembler};
//!
//! let config = Config::default();
//! let vault = Arc::new(FsVaultWriter::new(&config.vault_dir));
//! let promotion = PromotionEngine::new(vector.clone(), vault, config.promotion.clone());
//! let retrieval = RetrievalAssembler::new(vector, config.retrieval.clone());
//!
//! // Promote a well-used observation into the vault
//! promotion.promote(&"observation::1714000000000".into()).await?;
//!
//! // Assemble a budgeted answer set
//! let response = retrieval.search("pond maintenance schedule").await?;
//! ```

pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod identity;
pub mod promotion;
pub mod retrieval;
pub mod scorer;
pub mod store;

pub use chunker::{chunk_document, Chunk, ChunkResult};
pub use config::Config;
pub use document::{strip_frontmatter, Document, DocumentMetadata};
pub use error::{Error, Result};
pub use identity::{slugify, DocumentId, Namespace, ParsedId, Tier};
pub use promotion::{evaluate, PromotionDecision, PromotionEngine, PromotionOutcome};
pub use retrieval::{MatchMode, RetrievalAssembler, SearchMatch, SearchResponse};
pub use scorer::Scorer;
pub use store::{FsVaultWriter, QueryHit, SecretDetection, SecretScanner, VaultWriter, VectorStore};
