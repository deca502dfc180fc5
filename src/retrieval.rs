//! Budget-aware retrieval assembly
//!
//! Raw similarity hits become a bounded result set: scored for relevance,
//! filtered for sensitivity, deduplicated per parent document, then packed
//! under a character budget split evenly between tiers. A half that cannot
//! spend its budget donates the remainder to the other half, once.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::identity::{DocumentId, Namespace, Tier};
use crate::store::{QueryHit, VectorStore};

/// How a match renders in the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Durable documents render as a short pointer, not the body
    Reference,

    /// Ephemeral documents render with their complete content
    Full,
}

/// One accepted search match
#[derive(Debug, Clone)]
pub struct SearchMatch {
    /// Identifier of the matched document or chunk
    pub id: DocumentId,

    /// Parent document identifier (chunk suffix removed)
    pub parent_id: DocumentId,

    /// Storage tier
    pub tier: Tier,

    /// Relevance in [0, 1]
    pub relevance: f64,

    /// Rendering mode
    pub mode: MatchMode,

    /// Rendered text charged against the budget
    pub text: String,

    /// Character cost of `text`
    pub char_cost: usize,
}

/// Character budget actually consumed per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetUsed {
    pub durable: usize,
    pub ephemeral: usize,
}

/// The assembled result of one search
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Accepted matches: durable first, then ephemeral, each ranked by
    /// relevance descending
    pub matches: Vec<SearchMatch>,

    /// Budget consumed per tier
    pub budget_used: BudgetUsed,

    /// Candidates dropped because they live in an excluded location
    pub skipped_sensitive: usize,

    /// Human-readable explanation when no matches could be returned
    pub note: Option<String>,
}

/// Turns raw vector-store hits into a budgeted, tier-aware result list
pub struct RetrievalAssembler {
    vector: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl RetrievalAssembler {
    /// Create an assembler over an injected vector store
    pub fn new(vector: Arc<dyn VectorStore>, config: RetrievalConfig) -> Self {
        Self { vector, config }
    }

    /// Search with the configured threshold and budget
    pub async fn search(&self, query: &str) -> crate::error::Result<SearchResponse> {
        self.search_with(
            query,
            self.config.relevance_threshold,
            self.config.total_budget_chars,
        )
        .await
    }

    /// Search with an explicit relevance threshold and total character budget
    pub async fn search_with(
        &self,
        query: &str,
        relevance_threshold: f64,
        total_budget: usize,
    ) -> crate::error::Result<SearchResponse> {
        if self.vector.count().await? == 0 {
            return Ok(SearchResponse {
                matches: Vec::new(),
                budget_used: BudgetUsed::default(),
                skipped_sensitive: 0,
                note: Some("nothing indexed yet; the memory corpus is empty".to_string()),
            });
        }

        let hits = self.vector.query(query, self.config.candidate_pool).await?;

        let mut skipped_sensitive = 0usize;
        let mut candidates: Vec<SearchMatch> = Vec::new();
        for hit in hits {
            if self.is_sensitive(&hit) {
                skipped_sensitive += 1;
                continue;
            }
            let relevance = relevance(&hit);
            if relevance < relevance_threshold {
                continue;
            }
            candidates.push(to_match(hit, relevance));
        }
        if skipped_sensitive > 0 {
            warn!(skipped_sensitive, "dropped candidates from excluded locations");
        }

        // Chunk dedup: one candidate per parent document, best relevance wins.
        let mut best: HashMap<String, SearchMatch> = HashMap::new();
        for candidate in candidates {
            let key = candidate.parent_id.as_str().to_string();
            let replaces = best
                .get(&key)
                .map_or(true, |existing| candidate.relevance > existing.relevance);
            if replaces {
                best.insert(key, candidate);
            }
        }

        let mut durable: Vec<SearchMatch> = Vec::new();
        let mut ephemeral: Vec<SearchMatch> = Vec::new();
        for candidate in best.into_values() {
            match candidate.tier {
                Tier::Durable => durable.push(candidate),
                Tier::Ephemeral => ephemeral.push(candidate),
            }
        }
        sort_by_relevance(&mut durable);
        sort_by_relevance(&mut ephemeral);

        let half = total_budget / 2;
        let (mut durable_accepted, durable_rest, mut durable_used) = greedy(durable, half);
        let (mut ephemeral_accepted, ephemeral_rest, mut ephemeral_used) = greedy(ephemeral, half);

        // Overflow: one half's unspent budget reallocates to the other, once.
        let durable_leftover = half - durable_used;
        let ephemeral_leftover = half - ephemeral_used;
        if !durable_rest.is_empty() && ephemeral_leftover > 0 {
            let (extra, _, extra_used) =
                greedy(durable_rest, durable_leftover + ephemeral_leftover);
            durable_accepted.extend(extra);
            durable_used += extra_used;
        } else if !ephemeral_rest.is_empty() && durable_leftover > 0 {
            let (extra, _, extra_used) =
                greedy(ephemeral_rest, ephemeral_leftover + durable_leftover);
            ephemeral_accepted.extend(extra);
            ephemeral_used += extra_used;
        }

        let note = if durable_accepted.is_empty() && ephemeral_accepted.is_empty() {
            Some("no sufficiently relevant matches for this query".to_string())
        } else {
            None
        };

        debug!(
            durable = durable_accepted.len(),
            ephemeral = ephemeral_accepted.len(),
            durable_chars = durable_used,
            ephemeral_chars = ephemeral_used,
            "assembled search response"
        );

        let mut matches = durable_accepted;
        matches.append(&mut ephemeral_accepted);
        Ok(SearchResponse {
            matches,
            budget_used: BudgetUsed {
                durable: durable_used,
                ephemeral: ephemeral_used,
            },
            skipped_sensitive,
            note,
        })
    }

    /// Whether a hit originates from an excluded vault location
    fn is_sensitive(&self, hit: &QueryHit) -> bool {
        let parsed = hit.document.id.parse();
        if parsed.namespace != Namespace::Vault {
            return false;
        }
        self.config
            .excluded_prefixes
            .iter()
            .any(|prefix| parsed.content_id.starts_with(prefix.as_str()))
    }
}

/// Relevance: distance mapped to [0, 1], adjusted by the stored importance
/// label and clamped again
fn relevance(hit: &QueryHit) -> f64 {
    let base = (1.0 - hit.distance / 2.0).clamp(0.0, 1.0);
    let adjustment = match hit
        .document
        .metadata
        .importance_label
        .as_deref()
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("high") => 0.10,
        Some("low") => -0.05,
        _ => 0.0,
    };
    (base + adjustment).clamp(0.0, 1.0)
}

/// Render a hit into a budgetable match
fn to_match(hit: QueryHit, relevance: f64) -> SearchMatch {
    let doc = hit.document;
    let parent_id = doc.id.parent();
    let (mode, text) = match doc.tier {
        Tier::Durable => (
            MatchMode::Reference,
            format!("{} (relevance {:.2})", parent_id.parse().content_id, relevance),
        ),
        Tier::Ephemeral => (MatchMode::Full, doc.content),
    };
    let char_cost = text.chars().count();
    SearchMatch {
        id: doc.id,
        parent_id,
        tier: doc.tier,
        relevance,
        mode,
        text,
        char_cost,
    }
}

fn sort_by_relevance(matches: &mut [SearchMatch]) {
    matches.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });
}

/// Accept matches in order until one no longer fits the remaining budget
///
/// Returns the accepted matches, the unaccepted remainder, and the
/// characters consumed. Deliberately greedy: it never skips an oversized
/// item to admit smaller ones behind it.
fn greedy(
    candidates: Vec<SearchMatch>,
    budget: usize,
) -> (Vec<SearchMatch>, Vec<SearchMatch>, usize) {
    let mut accepted = Vec::new();
    let mut used = 0usize;
    let mut iter = candidates.into_iter();
    while let Some(candidate) = iter.next() {
        if used + candidate.char_cost > budget {
            let mut rest = vec![candidate];
            rest.extend(iter);
            return (accepted, rest, used);
        }
        used += candidate.char_cost;
        accepted.push(candidate);
    }
    (accepted, Vec::new(), used)
}
