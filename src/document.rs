//! Document records and the persisted metadata header
//!
//! Metadata is a closed struct with named fields rather than an open
//! string-keyed map, validated at the store boundary. The `---`-delimited
//! key/value header written by promotion is the same shape the chunker
//! strips, so promoted files re-chunk cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{DocumentId, Tier};

/// A persisted memory document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Namespaced identifier
    pub id: DocumentId,

    /// Storage tier, always derivable from `id`
    pub tier: Tier,

    /// Document body text
    pub content: String,

    /// Closed metadata record
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document, deriving the tier from the identifier
    pub fn new(id: DocumentId, content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        let tier = id.tier();
        Self {
            id,
            tier,
            content: content.into(),
            metadata,
        }
    }
}

/// Metadata carried by every document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Content type label (observation, pattern, decision, ...)
    pub doc_type: String,

    /// Importance in [0.0, 1.0]
    pub importance_score: f64,

    /// Stored importance label from frontmatter ("high", "low", ...), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance_label: Option<String>,

    /// Times this document has been read back. Stored as a float: legacy
    /// rescaling passes may have left fractional values behind.
    #[serde(default)]
    pub retrieval_count: f64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,

    /// Where the content came from (extraction, user, promotion, ...)
    pub source: String,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Scope label, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Project this document belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Files referenced by the content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Whether this document was produced by promotion
    #[serde(default)]
    pub promoted: bool,

    /// Identifier the document held before promotion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,

    /// When the document was promoted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_at: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    /// Create metadata for a freshly written document
    pub fn new(doc_type: impl Into<String>, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            doc_type: doc_type.into(),
            importance_score: 0.0,
            importance_label: None,
            retrieval_count: 0.0,
            created_at: now,
            updated_at: now,
            source: source.into(),
            tags: Vec::new(),
            scope: None,
            project: None,
            files: Vec::new(),
            promoted: false,
            original_id: None,
            promoted_at: None,
        }
    }

    /// Set the importance score
    pub fn with_importance(mut self, score: f64) -> Self {
        self.importance_score = score;
        self
    }

    /// Set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the project
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Render the `---`-delimited key/value header promotion persists
    /// ahead of the document body.
    pub fn render_header(&self) -> String {
        let mut lines = Vec::new();
        lines.push("---".to_string());
        lines.push(format!("type: {}", self.doc_type));
        lines.push(format!("importance: {}", format_number(self.importance_score)));
        if let Some(original_id) = &self.original_id {
            lines.push(format!("original_id: {}", original_id));
        }
        if let Some(promoted_at) = self.promoted_at {
            lines.push(format!("promoted_at: {}", promoted_at.to_rfc3339()));
        }
        lines.push(format!("source: {}", self.source));
        lines.push(format!("created_at: {}", self.created_at.to_rfc3339()));
        lines.push(format!(
            "retrieval_count: {}",
            format_number(self.retrieval_count)
        ));
        if let Some(scope) = &self.scope {
            lines.push(format!("scope: {}", scope));
        }
        if let Some(project) = &self.project {
            lines.push(format!("project: {}", project));
        }
        if !self.files.is_empty() {
            lines.push(format!("files: [{}]", self.files.join(", ")));
        }
        if !self.tags.is_empty() {
            lines.push(format!("tags: [{}]", self.tags.join(", ")));
        }
        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Format a float without a trailing `.0` when it is a whole number
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Strip a leading `---`-delimited metadata header, returning the body
///
/// Returns the input unchanged when no complete header is present.
pub fn strip_frontmatter(text: &str) -> &str {
    let rest = match text.strip_prefix("---") {
        Some(rest) if rest.starts_with('\n') || rest.starts_with("\r\n") => rest,
        _ => return text,
    };
    let mut offset = text.len() - rest.len();
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" && offset > 4 {
            return &text[offset..];
        }
    }
    // Opening delimiter with no closing one: not a header.
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata::new("observation", "extraction")
            .with_importance(0.91)
            .with_tags(vec!["garden".to_string(), "spring".to_string()])
            .with_project("backyard")
    }

    #[test]
    fn header_contains_required_keys() {
        let mut meta = sample_metadata();
        meta.promoted = true;
        meta.original_id = Some("observation::1714000000000".to_string());
        meta.promoted_at = Some(Utc::now());

        let header = meta.render_header();
        assert!(header.starts_with("---\n"));
        assert!(header.contains("type: observation"));
        assert!(header.contains("importance: 0.91"));
        assert!(header.contains("original_id: observation::1714000000000"));
        assert!(header.contains("retrieval_count: 0"));
        assert!(header.contains("project: backyard"));
        assert!(header.contains("tags: [garden, spring]"));
    }

    #[test]
    fn strip_removes_rendered_header() {
        let meta = sample_metadata();
        let full = format!("{}First line of the body.", meta.render_header());
        assert_eq!(strip_frontmatter(&full), "First line of the body.");
    }

    #[test]
    fn strip_leaves_plain_text_alone() {
        let text = "No header here.\n\nJust paragraphs.";
        assert_eq!(strip_frontmatter(text), text);
    }

    #[test]
    fn strip_ignores_unterminated_header() {
        let text = "---\ntype: note\nno closing delimiter";
        assert_eq!(strip_frontmatter(text), text);
    }

    #[test]
    fn document_derives_tier_from_id() {
        let doc = Document::new(
            DocumentId::new("observation::1714000000000"),
            "saw a heron by the pond",
            sample_metadata(),
        );
        assert_eq!(doc.tier, Tier::Ephemeral);

        let doc = Document::new(DocumentId::vault("notes/pond.md"), "", sample_metadata());
        assert_eq!(doc.tier, Tier::Durable);
    }
}
