//! Retrieval assembly tests against a fake vector store

mod common;

use std::sync::Arc;

use common::FakeVectorStore;
use quill_memory::config::RetrievalConfig;
use quill_memory::{
    Document, DocumentId, DocumentMetadata, MatchMode, RetrievalAssembler, Tier,
};

fn vault_doc(path: &str, body: &str) -> Document {
    Document::new(DocumentId::vault(path), body, DocumentMetadata::new("note", "vault"))
}

fn ephemeral_doc(id: &str, body: &str) -> Document {
    Document::new(
        DocumentId::new(id),
        body,
        DocumentMetadata::new("observation", "extraction"),
    )
}

fn assembler(store: &Arc<FakeVectorStore>, config: RetrievalConfig) -> RetrievalAssembler {
    RetrievalAssembler::new(store.clone(), config)
}

#[tokio::test]
async fn empty_corpus_returns_note_not_error() {
    let store = Arc::new(FakeVectorStore::new());
    let response = assembler(&store, RetrievalConfig::default())
        .search("anything")
        .await
        .unwrap();
    assert!(response.matches.is_empty());
    assert!(response.note.is_some());
    assert_eq!(response.budget_used.durable, 0);
    assert_eq!(response.budget_used.ephemeral, 0);
}

#[tokio::test]
async fn chunks_of_one_parent_deduplicate_to_best_hit() {
    let store = Arc::new(FakeVectorStore::new());
    let parent = DocumentId::vault("notes/pond.md");
    store.seed(
        Document::new(parent.chunk(0), "intro", DocumentMetadata::new("note", "vault")),
        0.8,
    );
    store.seed(
        Document::new(parent.chunk(1), "details", DocumentMetadata::new("note", "vault")),
        0.2,
    );

    let response = assembler(&store, RetrievalConfig::default())
        .search("pond")
        .await
        .unwrap();

    assert_eq!(response.matches.len(), 1);
    let m = &response.matches[0];
    assert_eq!(m.parent_id, parent);
    assert_eq!(m.id, parent.chunk(1)); // the closer chunk wins
    assert!((m.relevance - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn low_relevance_candidates_are_dropped() {
    let store = Arc::new(FakeVectorStore::new());
    store.seed(ephemeral_doc("observation::1", "close match"), 0.2);
    store.seed(ephemeral_doc("observation::2", "distant match"), 1.8);

    let response = assembler(&store, RetrievalConfig::default())
        .search("query")
        .await
        .unwrap();

    assert_eq!(response.matches.len(), 1);
    assert_eq!(response.matches[0].id.as_str(), "observation::1");
    assert_eq!(response.skipped_sensitive, 0);
}

#[tokio::test]
async fn sensitive_locations_are_skipped_and_counted() {
    let store = Arc::new(FakeVectorStore::new());
    store.seed(vault_doc("personal/diary.md", "private"), 0.1);
    store.seed(vault_doc("people/alice.md", "private"), 0.1);
    store.seed(vault_doc("notes/pond.md", "public"), 0.3);

    let response = assembler(&store, RetrievalConfig::default())
        .search("query")
        .await
        .unwrap();

    assert_eq!(response.skipped_sensitive, 2);
    assert_eq!(response.matches.len(), 1);
    assert!(response.matches[0].text.contains("notes/pond.md"));
}

#[tokio::test]
async fn importance_label_adjusts_relevance() {
    let store = Arc::new(FakeVectorStore::new());
    let mut boosted = ephemeral_doc("observation::boosted", "same distance");
    boosted.metadata.importance_label = Some("high".to_string());
    let mut dampened = ephemeral_doc("observation::dampened", "same distance");
    dampened.metadata.importance_label = Some("low".to_string());
    store.seed(boosted, 0.6);
    store.seed(dampened, 0.6);
    store.seed(ephemeral_doc("observation::plain", "same distance"), 0.6);

    let response = assembler(&store, RetrievalConfig::default())
        .search("query")
        .await
        .unwrap();

    let relevance_of = |id: &str| {
        response
            .matches
            .iter()
            .find(|m| m.id.as_str() == id)
            .map(|m| m.relevance)
            .unwrap()
    };
    assert!((relevance_of("observation::plain") - 0.7).abs() < 1e-9);
    assert!((relevance_of("observation::boosted") - 0.8).abs() < 1e-9);
    assert!((relevance_of("observation::dampened") - 0.65).abs() < 1e-9);
    assert_eq!(response.matches[0].id.as_str(), "observation::boosted");
}

#[tokio::test]
async fn durable_matches_are_references_and_ephemeral_are_full() {
    let store = Arc::new(FakeVectorStore::new());
    store.seed(
        vault_doc("notes/pond.md", "a very long durable body that should never render"),
        0.2,
    );
    store.seed(ephemeral_doc("observation::1", "short ephemeral body"), 0.2);

    let response = assembler(&store, RetrievalConfig::default())
        .search("query")
        .await
        .unwrap();

    assert_eq!(response.matches.len(), 2);

    // Durable group comes first.
    let durable = &response.matches[0];
    assert_eq!(durable.tier, Tier::Durable);
    assert_eq!(durable.mode, MatchMode::Reference);
    assert!(durable.text.contains("notes/pond.md"));
    assert!(durable.text.contains("relevance 0.90"));
    assert!(!durable.text.contains("durable body"));

    let ephemeral = &response.matches[1];
    assert_eq!(ephemeral.tier, Tier::Ephemeral);
    assert_eq!(ephemeral.mode, MatchMode::Full);
    assert_eq!(ephemeral.text, "short ephemeral body");
}

#[tokio::test]
async fn unused_half_budget_overflows_to_the_other_tier() {
    let store = Arc::new(FakeVectorStore::new());
    // Ten durable-only candidates, each costing exactly 120 chars in
    // reference mode: 103-char path + " (relevance 0.90)".
    for i in 0..10 {
        let path = format!("{}{:02}", "n".repeat(101), i);
        assert_eq!(path.chars().count(), 103);
        store.seed(vault_doc(&path, "body"), 0.2);
    }

    let config = RetrievalConfig {
        total_budget_chars: 1200,
        ..RetrievalConfig::default()
    };
    let response = assembler(&store, config).search("query").await.unwrap();

    for m in &response.matches {
        assert_eq!(m.char_cost, 120);
    }
    // A 600-char half admits 5; the idle ephemeral half donates its 600.
    assert!(response.matches.len() > 5);
    assert_eq!(response.matches.len(), 10);
    assert_eq!(response.budget_used.durable, 1200);
    assert_eq!(response.budget_used.ephemeral, 0);
}

#[tokio::test]
async fn unused_durable_half_overflows_to_ephemeral() {
    let store = Arc::new(FakeVectorStore::new());
    // Ten ephemeral-only candidates, each a 120-char body in full mode.
    for i in 0..10 {
        let body = format!("{:03} {}", i, "e".repeat(116));
        assert_eq!(body.chars().count(), 120);
        store.seed(ephemeral_doc(&format!("observation::{i}"), &body), 0.2);
    }

    let config = RetrievalConfig {
        total_budget_chars: 1200,
        ..RetrievalConfig::default()
    };
    let response = assembler(&store, config).search("query").await.unwrap();

    // A 600-char half admits 5; the idle durable half donates its 600.
    assert_eq!(response.matches.len(), 10);
    assert!(response.matches.iter().all(|m| m.tier == Tier::Ephemeral));
    assert_eq!(response.budget_used.ephemeral, 1200);
    assert_eq!(response.budget_used.durable, 0);
}

#[tokio::test]
async fn total_budget_is_never_exceeded() {
    let store = Arc::new(FakeVectorStore::new());
    for i in 0..8 {
        store.seed(
            ephemeral_doc(
                &format!("observation::{i}"),
                &"eighty chars of body text ".repeat(10),
            ),
            0.2,
        );
        store.seed(vault_doc(&format!("notes/{i}.md"), "body"), 0.2);
    }

    let config = RetrievalConfig {
        total_budget_chars: 700,
        ..RetrievalConfig::default()
    };
    let response = assembler(&store, config).search("query").await.unwrap();

    let total_used = response.budget_used.durable + response.budget_used.ephemeral;
    assert!(total_used <= 700, "used {total_used} of 700");
    let charged: usize = response.matches.iter().map(|m| m.char_cost).sum();
    assert_eq!(charged, total_used);
}

#[tokio::test]
async fn no_relevant_matches_returns_note() {
    let store = Arc::new(FakeVectorStore::new());
    store.seed(ephemeral_doc("observation::1", "distant"), 1.9);

    let response = assembler(&store, RetrievalConfig::default())
        .search("query")
        .await
        .unwrap();
    assert!(response.matches.is_empty());
    assert!(response.note.is_some());
}
