//! Namespaced document identifiers and storage-tier classification
//!
//! Every document in the substrate is addressed as `<namespace>::<content-id>`,
//! optionally suffixed `#chunk-<n>` for an individual chunk. The namespace
//! prefix alone decides whether a document lives in the durable (file-backed)
//! or ephemeral (index-only) tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between namespace prefix and content id
const NS_SEPARATOR: &str = "::";

/// Suffix marker for chunk-level identifiers
const CHUNK_MARKER: &str = "#chunk-";

/// Storage tier of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// File-backed, human-visible storage
    Durable,

    /// Index-only, auto-generated storage
    Ephemeral,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Durable => write!(f, "durable"),
            Tier::Ephemeral => write!(f, "ephemeral"),
        }
    }
}

/// Closed set of identifier namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    Vault,
    MemoryGlobal,
    MemoryProject,
    Observation,
    Pattern,
    Summary,
    Code,
    Relationship,
    Hint,
    Plan,
    Learning,
    Decision,
    Worklog,
}

impl Namespace {
    /// All namespaces, in declaration order
    pub const ALL: [Namespace; 13] = [
        Namespace::Vault,
        Namespace::MemoryGlobal,
        Namespace::MemoryProject,
        Namespace::Observation,
        Namespace::Pattern,
        Namespace::Summary,
        Namespace::Code,
        Namespace::Relationship,
        Namespace::Hint,
        Namespace::Plan,
        Namespace::Learning,
        Namespace::Decision,
        Namespace::Worklog,
    ];

    /// The identifier prefix for this namespace
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Vault => "vault",
            Namespace::MemoryGlobal => "memory-global",
            Namespace::MemoryProject => "memory-project",
            Namespace::Observation => "observation",
            Namespace::Pattern => "pattern",
            Namespace::Summary => "summary",
            Namespace::Code => "code",
            Namespace::Relationship => "relationship",
            Namespace::Hint => "hint",
            Namespace::Plan => "plan",
            Namespace::Learning => "learning",
            Namespace::Decision => "decision",
            Namespace::Worklog => "worklog",
        }
    }

    /// Look up a namespace by its prefix string
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ns| ns.prefix() == prefix)
    }

    /// The storage tier all identifiers in this namespace map to
    pub fn tier(&self) -> Tier {
        match self {
            Namespace::Vault | Namespace::MemoryGlobal | Namespace::MemoryProject => Tier::Durable,
            _ => Tier::Ephemeral,
        }
    }

    /// Namespaces whose content id is a slug of a human-given name
    pub fn is_name_bearing(&self) -> bool {
        matches!(
            self,
            Namespace::MemoryGlobal
                | Namespace::MemoryProject
                | Namespace::Pattern
                | Namespace::Plan
                | Namespace::Decision
                | Namespace::Code
                | Namespace::Relationship
                | Namespace::Hint
        )
    }

    /// Namespaces whose content id defaults to a millisecond timestamp
    pub fn is_timestamp_bearing(&self) -> bool {
        matches!(
            self,
            Namespace::Observation | Namespace::Summary | Namespace::Learning | Namespace::Worklog
        )
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Slugify a human-given name: lowercase, replace anything outside
/// `[a-z0-9-]` with `-`, collapse runs of `-`, trim leading/trailing `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash
    for ch in name.chars() {
        let mapped = match ch.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9') => Some(c),
            _ => None,
        };
        match mapped {
            Some(c) => {
                slug.push(c);
                last_dash = false;
            }
            None => {
                if !last_dash {
                    slug.push('-');
                    last_dash = true;
                }
            }
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// A namespaced document identifier
///
/// Opaque string of the form `<namespace>::<content-id>[#chunk-<n>]`.
/// Bare strings without a `::` separator are legacy vault paths and classify
/// as durable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a raw identifier string without validation
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate an identifier in a name-bearing namespace
    pub fn named(namespace: Namespace, name: &str) -> Result<Self> {
        if !namespace.is_name_bearing() {
            return Err(Error::validation(format!(
                "namespace '{}' does not take a name",
                namespace
            )));
        }
        if namespace == Namespace::Relationship {
            return Err(Error::validation(
                "relationship identifiers take two participants",
            ));
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(Error::validation(format!(
                "name '{}' produces an empty slug",
                name
            )));
        }
        Ok(Self(format!("{}{}{}", namespace.prefix(), NS_SEPARATOR, slug)))
    }

    /// Generate an identifier in a timestamp-bearing namespace
    ///
    /// Defaults to the current time in milliseconds when `at` is `None`.
    pub fn timestamped(namespace: Namespace, at: Option<DateTime<Utc>>) -> Result<Self> {
        if !namespace.is_timestamp_bearing() {
            return Err(Error::validation(format!(
                "namespace '{}' does not take a timestamp",
                namespace
            )));
        }
        let millis = at.unwrap_or_else(Utc::now).timestamp_millis();
        Ok(Self(format!(
            "{}{}{}",
            namespace.prefix(),
            NS_SEPARATOR,
            millis
        )))
    }

    /// Generate a relationship identifier for two participants
    ///
    /// The participant slugs are sorted, so `relationship(a, b)` and
    /// `relationship(b, a)` produce the same identifier.
    pub fn relationship(a: &str, b: &str) -> Result<Self> {
        let (slug_a, slug_b) = (slugify(a), slugify(b));
        if slug_a.is_empty() || slug_b.is_empty() {
            return Err(Error::validation(
                "relationship participants produce an empty slug",
            ));
        }
        let (first, second) = if slug_a <= slug_b {
            (slug_a, slug_b)
        } else {
            (slug_b, slug_a)
        };
        Ok(Self(format!(
            "{}{}{}-{}",
            Namespace::Relationship.prefix(),
            NS_SEPARATOR,
            first,
            second
        )))
    }

    /// Generate a vault identifier from a vault-relative file path
    ///
    /// Vault content ids are paths, kept verbatim rather than slugified.
    pub fn vault(relative_path: &str) -> Self {
        Self(format!(
            "{}{}{}",
            Namespace::Vault.prefix(),
            NS_SEPARATOR,
            relative_path
        ))
    }

    /// Derive the identifier of chunk `index` of this document
    pub fn chunk(&self, index: usize) -> Self {
        Self(format!("{}{}{}", self.parent().0, CHUNK_MARKER, index))
    }

    /// The parent document identifier, with any chunk suffix removed
    pub fn parent(&self) -> Self {
        match self.split_chunk() {
            (base, Some(_)) => Self(base.to_string()),
            _ => self.clone(),
        }
    }

    /// The raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The storage tier this identifier maps to
    ///
    /// Total: unrecognized prefixes and legacy bare paths classify as
    /// vault/durable.
    pub fn tier(&self) -> Tier {
        self.parse().tier
    }

    /// Decompose the identifier into its parts
    ///
    /// Never fails: identifiers that carry no known namespace prefix are
    /// treated as legacy vault paths.
    pub fn parse(&self) -> ParsedId {
        let (base, chunk) = self.split_chunk();
        match base.split_once(NS_SEPARATOR) {
            Some((prefix, content_id)) => {
                let namespace = Namespace::from_prefix(prefix).unwrap_or(Namespace::Vault);
                ParsedId {
                    namespace,
                    full_prefix: prefix.to_string(),
                    content_id: content_id.to_string(),
                    chunk,
                    tier: namespace.tier(),
                }
            }
            None => ParsedId {
                namespace: Namespace::Vault,
                full_prefix: String::new(),
                content_id: base.to_string(),
                chunk,
                tier: Tier::Durable,
            },
        }
    }

    /// Split off a trailing `#chunk-<n>` suffix, if well formed
    fn split_chunk(&self) -> (&str, Option<usize>) {
        if let Some(pos) = self.0.rfind(CHUNK_MARKER) {
            let digits = &self.0[pos + CHUNK_MARKER.len()..];
            if !digits.is_empty() {
                if let Ok(index) = digits.parse::<usize>() {
                    return (&self.0[..pos], Some(index));
                }
            }
        }
        (&self.0, None)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// The decomposed parts of a [`DocumentId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    /// Classified namespace; unknown prefixes fall back to vault
    pub namespace: Namespace,

    /// The literal prefix text, empty for legacy bare paths
    pub full_prefix: String,

    /// Content-identifying portion, without prefix or chunk suffix
    pub content_id: String,

    /// Chunk index, if the identifier addresses a single chunk
    pub chunk: Option<usize>,

    /// Storage tier the identifier maps to
    pub tier: Tier,
}
