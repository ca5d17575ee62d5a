//! Determinism guarantees: identical inputs must produce identical chunks,
//! vectors, and rankings across runs.

use std::sync::Arc;

use edurag::{
    chunk, ingest_document, ChunkConfig, Embedder, MemoryStore, NewDocument, RetrievalConfig,
    RetrievalRequest, Retriever, StubEmbedder,
};

fn doc(title: &str, content: &str) -> NewDocument {
    NewDocument {
        title: title.into(),
        content: content.into(),
        subject: Some("science".into()),
        grade_level: Some("8".into()),
        language: "en-IN".into(),
        source: None,
        document_type: None,
    }
}

#[test]
fn chunking_is_deterministic() {
    let text = "Matter exists in three common states: solid, liquid, and gas. ".repeat(12);
    let cfg = ChunkConfig {
        chunk_size: 150,
        overlap: 30,
    };

    let first: Vec<_> = chunk(&text, &cfg).unwrap().collect();
    let second: Vec<_> = chunk(&text, &cfg).unwrap().collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn stub_embeddings_are_deterministic_across_instances() {
    let a = StubEmbedder::with_dimensions(128);
    let b = StubEmbedder::with_dimensions(128);

    let text = "acids turn blue litmus red";
    assert_eq!(a.embed(text).await.unwrap(), b.embed(text).await.unwrap());
}

#[tokio::test]
async fn distinct_texts_embed_differently() {
    let embedder = StubEmbedder::with_dimensions(128);
    let a = embedder.embed("acids turn blue litmus red").await.unwrap();
    let b = embedder.embed("bases turn red litmus blue").await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn repeated_queries_return_identical_rankings() {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(64));

    for (title, content) in [
        ("Acids", "acids turn blue litmus red and taste sour"),
        ("Bases", "bases turn red litmus blue and feel soapy"),
        ("Salts", "salts form when acids react with bases"),
    ] {
        ingest_document(
            store.as_ref(),
            embedder.as_ref(),
            &ChunkConfig::default(),
            doc(title, content),
        )
        .await
        .unwrap();
    }

    let retriever = Retriever::new(
        store,
        embedder,
        RetrievalConfig {
            min_similarity: None,
            ..Default::default()
        },
    )
    .unwrap();

    let req = RetrievalRequest::query("what happens when acids react");
    let first = retriever.retrieve(&req).await.unwrap();
    let second = retriever.retrieve(&req).await.unwrap();
    assert_eq!(first, second);

    for (pos, hit) in first.iter().enumerate() {
        assert_eq!(hit.rank, pos + 1);
    }
}
