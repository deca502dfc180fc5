//! Ephemeral-to-durable promotion
//!
//! A document promotes when it proves important or well-used. The file write
//! always precedes the record swap, so a crash mid-promotion leaves the
//! ephemeral record intact and re-promotable rather than losing content.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::PromotionConfig;
use crate::document::{Document, DocumentMetadata};
use crate::error::{Error, Result};
use crate::identity::{slugify, DocumentId, Tier};
use crate::store::{VaultWriter, VectorStore};

/// The verdict of evaluating a document against promotion criteria
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionDecision {
    /// Whether any criterion was satisfied
    pub should_promote: bool,

    /// One entry per satisfied criterion
    pub reasons: Vec<String>,
}

/// Evaluate promotion criteria against a document's metadata
///
/// Pure: every satisfied criterion contributes a reason, none short-circuit.
pub fn evaluate(
    metadata: &DocumentMetadata,
    config: &PromotionConfig,
    now: DateTime<Utc>,
) -> PromotionDecision {
    let mut reasons = Vec::new();

    if metadata.importance_score >= config.importance_threshold {
        reasons.push(format!(
            "importance {:.2} >= threshold {:.2}",
            metadata.importance_score, config.importance_threshold
        ));
    }

    // Strict greater-than on the stored value, which may be fractional.
    if metadata.retrieval_count > config.retrieval_count_threshold {
        reasons.push(format!(
            "retrieved {} times (> {})",
            metadata.retrieval_count, config.retrieval_count_threshold
        ));
    }

    let age_days = (now - metadata.created_at).num_seconds() as f64 / 86_400.0;
    if age_days >= config.age_importance_days
        && metadata.importance_score >= config.age_importance_score
    {
        reasons.push(format!(
            "aged {:.0} days with importance {:.2} >= {:.2}",
            age_days, metadata.importance_score, config.age_importance_score
        ));
    }

    PromotionDecision {
        should_promote: !reasons.is_empty(),
        reasons,
    }
}

/// The outcome of a `promote` call
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// The document was moved to the durable tier
    Promoted {
        /// Its new vault identifier
        new_id: DocumentId,

        /// Vault-relative path of the written file
        vault_path: String,
    },

    /// The document (or its target file) was already promoted; nothing
    /// was written
    AlreadyPromoted,

    /// Another promotion of the same identifier is in flight
    InProgress,
}

/// Moves ephemeral documents into the durable vault
pub struct PromotionEngine {
    vector: Arc<dyn VectorStore>,
    vault: Arc<dyn VaultWriter>,
    config: PromotionConfig,

    /// Identifiers with a promotion currently in flight. An in-process
    /// advisory claim: the collaborator store does not serialize the
    /// fetch/write/swap sequence for us.
    in_flight: Arc<Mutex<HashSet<String>>>,

    /// Identifiers this engine has finished promoting. The record swap
    /// removes the old identifier from the store, so retries resolve
    /// through this memo instead of failing as not-found.
    completed: Mutex<HashSet<String>>,
}

impl PromotionEngine {
    /// Create an engine over injected collaborators
    pub fn new(
        vector: Arc<dyn VectorStore>,
        vault: Arc<dyn VaultWriter>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            vector,
            vault,
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            completed: Mutex::new(HashSet::new()),
        }
    }

    /// The promotion thresholds in use
    pub fn config(&self) -> &PromotionConfig {
        &self.config
    }

    /// Evaluate a document's metadata against this engine's thresholds
    pub fn evaluate(&self, metadata: &DocumentMetadata) -> PromotionDecision {
        evaluate(metadata, &self.config, Utc::now())
    }

    /// Promote an ephemeral document to the durable vault
    ///
    /// Idempotent: promoting an already-promoted document, or retrying after
    /// the target file exists, succeeds without writing anything.
    pub async fn promote(&self, id: &DocumentId) -> Result<PromotionOutcome> {
        let _claim = match Claim::take(&self.in_flight, id) {
            Some(claim) => claim,
            None => {
                debug!(id = %id, "promotion already in flight");
                return Ok(PromotionOutcome::InProgress);
            }
        };

        if self
            .completed
            .lock()
            .expect("completed set poisoned")
            .contains(id.as_str())
        {
            debug!(id = %id, "already promoted by this engine");
            return Ok(PromotionOutcome::AlreadyPromoted);
        }

        let doc = self
            .vector
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("document {id}")))?;

        if doc.tier != Tier::Ephemeral {
            return Err(Error::tier_mismatch(format!(
                "{id} is {}, only ephemeral documents promote",
                doc.tier
            )));
        }

        if doc.metadata.promoted {
            debug!(id = %id, "document already promoted");
            return Ok(PromotionOutcome::AlreadyPromoted);
        }

        let now = Utc::now();
        let vault_path = target_path(&doc, now)?;

        if self.vault.exists(&vault_path).await? {
            info!(id = %id, path = %vault_path, "target file already exists, treating as promoted");
            return Ok(PromotionOutcome::AlreadyPromoted);
        }

        let mut metadata = doc.metadata.clone();
        metadata.promoted = true;
        metadata.original_id = Some(id.as_str().to_string());
        metadata.promoted_at = Some(now);
        metadata.updated_at = now;

        // File write first. If it fails, the ephemeral record is untouched
        // and the document stays re-promotable.
        let file_content = format!("{}{}", metadata.render_header(), doc.content);
        self.vault.write(&vault_path, &file_content).await?;

        let new_id = DocumentId::vault(&vault_path);
        self.vector.delete(std::slice::from_ref(id)).await?;
        self.vector
            .upsert(vec![Document::new(new_id.clone(), doc.content, metadata)])
            .await?;

        self.completed
            .lock()
            .expect("completed set poisoned")
            .insert(id.as_str().to_string());

        info!(old_id = %id, new_id = %new_id, "promoted to durable tier");
        Ok(PromotionOutcome::Promoted {
            new_id,
            vault_path,
        })
    }
}

/// Vault directory per promotable content type
fn promotion_dir(doc_type: &str) -> Option<&'static str> {
    match doc_type {
        "observation" => Some("observations"),
        "pattern" => Some("patterns"),
        "summary" => Some("summaries"),
        "learning" => Some("learnings"),
        "decision" => Some("decisions"),
        _ => None,
    }
}

/// Deterministic vault-relative path for a promoted document
fn target_path(doc: &Document, now: DateTime<Utc>) -> Result<String> {
    let dir = promotion_dir(&doc.metadata.doc_type).ok_or_else(|| {
        Error::unsupported_type(format!(
            "content type '{}' has no promotion target",
            doc.metadata.doc_type
        ))
    })?;

    let slug = title_slug(&doc.content);
    let filename = format!("{}-{}.md", now.format("%Y-%m-%d"), slug);

    Ok(match &doc.metadata.project {
        Some(project) => format!("{dir}/{}/{filename}", slugify(project)),
        None => format!("{dir}/{filename}"),
    })
}

/// Slug for the filename, taken from the first non-empty content line
fn title_slug(content: &str) -> String {
    let title = content
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("note");
    let mut slug = slugify(title);
    if slug.is_empty() {
        slug = "note".to_string();
    }
    slug.truncate(60);
    let trimmed = slug.trim_end_matches('-').to_string();
    if trimmed.is_empty() {
        "note".to_string()
    } else {
        trimmed
    }
}

/// RAII claim on an identifier in the in-flight set
struct Claim {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Claim {
    fn take(set: &Arc<Mutex<HashSet<String>>>, id: &DocumentId) -> Option<Self> {
        let mut guard = set.lock().expect("in-flight set poisoned");
        if !guard.insert(id.as_str().to_string()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            key: id.as_str().to_string(),
        })
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.set.lock() {
            guard.remove(&self.key);
        }
    }
}
