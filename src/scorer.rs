//! Importance scoring
//!
//! A pure function of content, type, recency, and access history. An
//! explicit importance (numeric or a named level) replaces the type-weight
//! base entirely; bonuses stack on top and the final score clamps to [0, 1].

use chrono::{DateTime, Utc};

use crate::config::ScorerConfig;

/// Importance scorer
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScorerConfig,
}

impl Scorer {
    /// Create a scorer from its configuration
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Score a document's importance, using the current time for recency
    pub fn score(
        &self,
        content: &str,
        type_label: &str,
        explicit_importance: Option<&str>,
        created_at: Option<DateTime<Utc>>,
        retrieval_count: f64,
    ) -> f64 {
        self.score_at(
            content,
            type_label,
            explicit_importance,
            created_at,
            retrieval_count,
            Utc::now(),
        )
    }

    /// Score a document's importance against an explicit "now"
    ///
    /// Deterministic for identical inputs and configuration.
    pub fn score_at(
        &self,
        content: &str,
        type_label: &str,
        explicit_importance: Option<&str>,
        created_at: Option<DateTime<Utc>>,
        retrieval_count: f64,
        now: DateTime<Utc>,
    ) -> f64 {
        let base = explicit_importance
            .and_then(parse_explicit_importance)
            .unwrap_or_else(|| self.type_weight(type_label));

        let score = base
            + self.concept_bonus(content)
            + self.recency_bonus(created_at, now)
            + retrieval_bonus(retrieval_count);

        score.clamp(0.0, 1.0)
    }

    /// Base weight for a content type, falling back to the default
    fn type_weight(&self, type_label: &str) -> f64 {
        self.config
            .type_weights
            .get(type_label)
            .copied()
            .unwrap_or(self.config.default_type_weight)
    }

    /// Sum of bonuses for every concept pattern matching the content,
    /// capped at the configured maximum
    fn concept_bonus(&self, content: &str) -> f64 {
        let haystack = content.to_lowercase();
        let total: f64 = self
            .config
            .concept_patterns
            .iter()
            .filter(|cp| haystack.contains(&cp.pattern.to_lowercase()))
            .map(|cp| cp.bonus)
            .sum();
        total.min(self.config.concept_bonus_cap)
    }

    /// Exponential decay of age against the configured half-life,
    /// rounded to four decimals
    fn recency_bonus(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let half_life = self.config.recency_half_life_days;
        let created_at = match created_at {
            Some(ts) if half_life > 0.0 => ts,
            _ => return 0.0,
        };
        let age_days = ((now - created_at).num_seconds() as f64 / 86_400.0).max(0.0);
        let bonus = 0.1 * 2f64.powf(-age_days / half_life);
        (bonus * 10_000.0).round() / 10_000.0
    }
}

/// Parse an explicit importance: a numeric string clamped to [0, 1] or a
/// named level (critical/high/medium/low, case-insensitive)
pub fn parse_explicit_importance(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value.clamp(0.0, 1.0));
    }
    match trimmed.to_lowercase().as_str() {
        "critical" => Some(0.95),
        "high" => Some(0.8),
        "medium" => Some(0.5),
        "low" => Some(0.3),
        _ => None,
    }
}

/// Diminishing bonus for repeated retrievals: `min(0.1, log2(n + 1) / 10)`
fn retrieval_bonus(retrieval_count: f64) -> f64 {
    if retrieval_count <= 0.0 {
        return 0.0;
    }
    ((retrieval_count + 1.0).log2() / 10.0).min(0.1)
}
