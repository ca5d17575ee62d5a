use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edurag::{
    ingest_document, ChunkConfig, MemoryStore, NewDocument, RetrievalConfig, RetrievalRequest,
    Retriever, StubEmbedder,
};

fn seeded_retriever(rt: &tokio::runtime::Runtime, documents: usize) -> Retriever {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(StubEmbedder::with_dimensions(256));
    let chunking = ChunkConfig {
        chunk_size: 200,
        overlap: 40,
    };

    rt.block_on(async {
        for i in 0..documents {
            let doc = NewDocument {
                title: format!("Bench document {i}"),
                content: format!(
                    "Document number {i} covers a distinct topic with enough \
                     repeated filler text to produce several chunks per \
                     document when split. "
                )
                .repeat(6),
                subject: Some(if i % 2 == 0 { "science" } else { "history" }.into()),
                grade_level: Some(format!("{}", 6 + i % 4)),
                language: "en-IN".into(),
                source: None,
                document_type: None,
            };
            ingest_document(store.as_ref(), embedder.as_ref(), &chunking, doc)
                .await
                .expect("bench ingest");
        }
    });

    Retriever::new(
        store,
        embedder,
        RetrievalConfig {
            min_similarity: None,
            ..Default::default()
        },
    )
    .expect("bench retriever")
}

fn retrieve_top_k(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("bench runtime");
    let retriever = seeded_retriever(&rt, 100);
    let request = RetrievalRequest::query("which document covers a distinct topic");

    c.bench_function("retrieve_top_k_100_docs", |b| {
        b.iter(|| {
            let hits = rt
                .block_on(retriever.retrieve(black_box(&request)))
                .expect("bench retrieve");
            black_box(hits);
        });
    });
}

fn retrieve_with_filter(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("bench runtime");
    let retriever = seeded_retriever(&rt, 100);
    let request = RetrievalRequest {
        filter: edurag::ChunkFilter {
            subject: Some("science".into()),
            grade_level: None,
        },
        ..RetrievalRequest::query("which document covers a distinct topic")
    };

    c.bench_function("retrieve_with_subject_filter", |b| {
        b.iter(|| {
            let hits = rt
                .block_on(retriever.retrieve(black_box(&request)))
                .expect("bench retrieve");
            black_box(hits);
        });
    });
}

criterion_group!(retrieval_benches, retrieve_top_k, retrieve_with_filter);
criterion_main!(retrieval_benches);
