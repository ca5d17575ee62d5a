//! Error propagation across pipeline stages.

use std::sync::Arc;

use edurag::{
    chunk, ingest_document, update_document, ChunkConfig, ChunkError, MemoryStore, NewDocument,
    PipelineError, RetrievalConfig, RetrievalError, RetrievalRequest, Retriever, StoreError,
    StubEmbedder, VectorStore,
};
use uuid::Uuid;

fn doc(content: &str) -> NewDocument {
    NewDocument {
        title: "Errors".into(),
        content: content.into(),
        subject: None,
        grade_level: None,
        language: "en-IN".into(),
        source: None,
        document_type: None,
    }
}

#[test]
fn overlap_equal_to_chunk_size_is_rejected() {
    let cfg = ChunkConfig {
        chunk_size: 100,
        overlap: 100,
    };
    let err = chunk("some text", &cfg).unwrap_err();
    assert!(matches!(err, ChunkError::InvalidParameter(_)));
    assert!(err.to_string().contains("overlap"));
}

#[test]
fn overlap_greater_than_chunk_size_is_rejected() {
    let cfg = ChunkConfig {
        chunk_size: 50,
        overlap: 80,
    };
    assert!(matches!(
        chunk("text", &cfg),
        Err(ChunkError::InvalidParameter(_))
    ));
}

#[test]
fn zero_chunk_size_is_rejected() {
    let cfg = ChunkConfig {
        chunk_size: 0,
        overlap: 0,
    };
    assert!(chunk("text", &cfg).is_err());
}

#[tokio::test]
async fn empty_content_surfaces_as_pipeline_error() {
    let store = MemoryStore::new();
    let embedder = StubEmbedder::with_dimensions(8);

    let err = ingest_document(&store, &embedder, &ChunkConfig::default(), doc(""))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyDocument));
}

#[tokio::test]
async fn update_of_missing_document_is_not_found() {
    let store = MemoryStore::new();
    let embedder = StubEmbedder::with_dimensions(8);
    let missing = Uuid::new_v4();

    let err = update_document(
        &store,
        &embedder,
        &ChunkConfig::default(),
        missing,
        doc("new content"),
    )
    .await
    .unwrap_err();
    match err {
        PipelineError::Store(StoreError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_ingest_leaves_store_untouched() {
    let store = MemoryStore::new();
    let embedder = StubEmbedder::with_dimensions(8);
    let bad = ChunkConfig {
        chunk_size: 10,
        overlap: 10,
    };

    let result = ingest_document(&store, &embedder, &bad, doc("content")).await;
    assert!(result.is_err());
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.documents, 0);
    assert_eq!(stats.chunks, 0);
}

#[tokio::test]
async fn retriever_rejects_blank_query() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(8));
    let retriever = Retriever::new(store, embedder, RetrievalConfig::default()).unwrap();

    let err = retriever
        .retrieve(&RetrievalRequest::query("\t  \n"))
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidRequest(_)));
}

#[tokio::test]
async fn pipeline_error_display_names_the_stage() {
    let store = MemoryStore::new();
    let embedder = StubEmbedder::with_dimensions(8);
    let bad = ChunkConfig {
        chunk_size: 5,
        overlap: 9,
    };

    let err = ingest_document(&store, &embedder, &bad, doc("content"))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("chunking failure"));
    assert!(std::error::Error::source(&err).is_some());
}
