//! Configuration for quill-memory
//!
//! Every tunable has a default; callers only override what they need.

use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for the memory substrate
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the durable vault
    pub vault_dir: PathBuf,

    /// Importance scoring tunables
    pub scorer: ScorerConfig,

    /// Document chunking tunables
    pub chunker: ChunkConfig,

    /// Promotion thresholds
    pub promotion: PromotionConfig,

    /// Retrieval assembly tunables
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        let vault_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("vault");

        Self {
            vault_dir,
            scorer: ScorerConfig::default(),
            chunker: ChunkConfig::default(),
            promotion: PromotionConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Config {
    /// Create a config with a custom vault root
    pub fn with_vault_dir(vault_dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: vault_dir.into(),
            ..Default::default()
        }
    }
}

/// Tunables for the importance scorer
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Base weight per content type
    pub type_weights: HashMap<String, f64>,

    /// Base weight for types missing from the table
    pub default_type_weight: f64,

    /// Case-insensitive content patterns and the bonus each one adds
    pub concept_patterns: Vec<ConceptPattern>,

    /// Cap on the summed concept bonus
    pub concept_bonus_cap: f64,

    /// Half-life of the recency bonus, in days; `<= 0` disables it
    pub recency_half_life_days: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        let type_weights = [
            ("journal", 0.65),
            ("note", 0.55),
            ("work", 0.60),
            ("inbox", 0.3),
            ("incident-log", 0.7),
            ("decision", 0.8),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let concept_patterns = [
            ("decision", 0.10),
            ("architecture", 0.10),
            ("design", 0.10),
            ("incident", 0.15),
            ("outage", 0.15),
            ("postmortem", 0.15),
            ("todo", 0.05),
            ("fixme", 0.05),
            ("hack", 0.05),
        ]
        .into_iter()
        .map(|(pattern, bonus)| ConceptPattern {
            pattern: pattern.to_string(),
            bonus,
        })
        .collect();

        Self {
            type_weights,
            default_type_weight: 0.5,
            concept_patterns,
            concept_bonus_cap: 0.20,
            recency_half_life_days: 7.0,
        }
    }
}

/// A content pattern that raises the importance of matching documents
#[derive(Debug, Clone)]
pub struct ConceptPattern {
    /// Substring matched case-insensitively against the content
    pub pattern: String,

    /// Bonus added when the pattern matches
    pub bonus: f64,
}

/// Tunables for the document chunker
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Whether chunking is enabled at all
    pub enabled: bool,

    /// Documents shorter than this stay whole; chunks shorter than this
    /// merge into their predecessor
    pub min_chars: usize,

    /// Target upper bound per chunk; sections beyond it split at
    /// paragraph boundaries
    pub max_chars: usize,

    /// Markdown heading levels that open a new chunk
    pub heading_levels: Vec<usize>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_chars: 200,
            max_chars: 1500,
            heading_levels: vec![2, 3],
        }
    }
}

/// Thresholds for ephemeral-to-durable promotion
#[derive(Debug, Clone)]
pub struct PromotionConfig {
    /// Importance at or above which a document promotes outright
    pub importance_threshold: f64,

    /// Retrieval count above which (strictly) a document promotes.
    /// Float because stored counts may be fractional after rescaling.
    pub retrieval_count_threshold: f64,

    /// Minimum age in days for the age-plus-importance criterion
    pub age_importance_days: f64,

    /// Minimum importance for the age-plus-importance criterion
    pub age_importance_score: f64,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            importance_threshold: 0.85,
            retrieval_count_threshold: 3.0,
            age_importance_days: 30.0,
            age_importance_score: 0.7,
        }
    }
}

/// Tunables for retrieval assembly
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Minimum relevance for a candidate to be considered
    pub relevance_threshold: f64,

    /// Hard character budget across both tiers
    pub total_budget_chars: usize,

    /// Vault path prefixes excluded from results (sensitive categories)
    pub excluded_prefixes: Vec<String>,

    /// How many raw candidates to pull from the vector store per query
    pub candidate_pool: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.3,
            total_budget_chars: 8000,
            excluded_prefixes: vec!["personal/".to_string(), "people/".to_string()],
            candidate_pool: 20,
        }
    }
}
