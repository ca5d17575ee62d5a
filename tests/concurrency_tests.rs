//! Concurrency and thread safety tests for the ingestion and retrieval paths.

use std::sync::Arc;
use std::thread;

use edurag::{
    chunk, ingest_document, ChunkConfig, MemoryStore, NewDocument, RetrievalConfig,
    RetrievalRequest, Retriever, StubEmbedder, VectorStore,
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
fn concurrent_chunking_same_config() {
    let config = Arc::new(ChunkConfig {
        chunk_size: 120,
        overlap: 30,
    });
    let text = "Concurrent chunking test text that is repeated a few times. ".repeat(8);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let config = Arc::clone(&config);
            let text = text.clone();
            thread::spawn(move || {
                chunk(&text, &config)
                    .expect("chunking should succeed")
                    .map(|piece| piece.to_owned_text())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // All threads must produce identical chunk sequences.
    let first = &results[0];
    for result in results.iter().skip(1) {
        assert_eq!(result, first);
    }
}

#[tokio::test]
async fn concurrent_ingests_all_land() {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(32));
    let chunking = ChunkConfig {
        chunk_size: 80,
        overlap: 20,
    };

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            let embedder = Arc::clone(&embedder);
            let chunking = chunking.clone();
            tokio::spawn(async move {
                ingest_document(
                    store.as_ref(),
                    embedder.as_ref(),
                    &chunking,
                    doc(
                        &format!("Concurrent {i}"),
                        &format!("document body number {i} with enough text to chunk"),
                    ),
                )
                .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().unwrap());
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(store.stats().await.unwrap().documents, 16);
}

#[tokio::test]
async fn concurrent_retrievals_are_consistent() {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(64));
    let chunking = ChunkConfig::default();

    for (title, content) in [
        ("Acids", "acids turn blue litmus red and taste sour"),
        ("Bases", "bases turn red litmus blue and feel soapy"),
        ("Salts", "salts form when acids react with bases"),
    ] {
        ingest_document(store.as_ref(), embedder.as_ref(), &chunking, doc(title, content))
            .await
            .unwrap();
    }

    let retriever = Arc::new(
        Retriever::new(
            store,
            embedder,
            RetrievalConfig {
                min_similarity: None,
                ..Default::default()
            },
        )
        .unwrap(),
    );

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let retriever = Arc::clone(&retriever);
            tokio::spawn(async move {
                retriever
                    .retrieve(&RetrievalRequest::query("what happens when acids react"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let first = &results[0];
    assert!(!first.is_empty());
    for result in results.iter().skip(1) {
        assert_eq!(result, first);
    }
}

#[tokio::test]
async fn retrievals_survive_interleaved_writes() {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(32));
    let chunking = ChunkConfig::default();

    ingest_document(
        store.as_ref(),
        embedder.as_ref(),
        &chunking,
        doc("Seed", "seed document so queries always have a candidate"),
    )
    .await
    .unwrap();

    let retriever = Arc::new(
        Retriever::new(
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&embedder) as Arc<dyn edurag::Embedder>,
            RetrievalConfig {
                min_similarity: None,
                ..Default::default()
            },
        )
        .unwrap(),
    );

    let writer = {
        let store = Arc::clone(&store);
        let embedder = Arc::clone(&embedder);
        let chunking = chunking.clone();
        tokio::spawn(async move {
            for i in 0..8 {
                ingest_document(
                    store.as_ref(),
                    embedder.as_ref(),
                    &chunking,
                    doc(&format!("Writer {i}"), &format!("interleaved body {i}")),
                )
                .await
                .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let retriever = Arc::clone(&retriever);
            tokio::spawn(async move {
                let hits = retriever
                    .retrieve(&RetrievalRequest::query("seed document"))
                    .await
                    .unwrap();
                assert!(!hits.is_empty());
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    assert_eq!(store.stats().await.unwrap().documents, 9);
}
