//! In-process store backend.
//!
//! Holds documents and chunks in plain tables behind one `RwLock`, so every
//! write is atomic by construction. Search is a brute-force scan ranked by
//! `(distance, insertion sequence)`, which keeps ties deterministic and
//! matches the Postgres backend's ordering.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::metric;
use crate::types::{
    ChunkFilter, DistanceMetric, Document, EmbeddedChunk, NewDocument, ScoredChunk, StoreStats,
};
use crate::{validate_chunks, VectorStore};

#[derive(Debug, Clone)]
struct DocRow {
    seq: u64,
    doc: NewDocument,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ChunkRow {
    seq: u64,
    document_id: Uuid,
    index: usize,
    text: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<Uuid, DocRow>,
    chunks: Vec<ChunkRow>,
    next_seq: u64,
    dimensions: Option<usize>,
}

impl Tables {
    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn append_chunks(&mut self, document_id: Uuid, chunks: Vec<EmbeddedChunk>) {
        for chunk in chunks {
            let seq = self.bump_seq();
            self.chunks.push(ChunkRow {
                seq,
                document_id,
                index: chunk.index,
                text: chunk.text,
                embedding: chunk.embedding,
            });
        }
    }

    fn document_view(&self, id: Uuid, row: &DocRow) -> Document {
        let chunk_count = self
            .chunks
            .iter()
            .filter(|c| c.document_id == id)
            .count() as u64;
        Document {
            id,
            title: row.doc.title.clone(),
            content: row.doc.content.clone(),
            subject: row.doc.subject.clone(),
            grade_level: row.doc.grade_level.clone(),
            language: row.doc.language.clone(),
            source: row.doc.source.clone(),
            document_type: row.doc.document_type.clone(),
            chunk_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Lock-guarded in-memory [`VectorStore`].
///
/// The embedding dimension is pinned by the first non-empty write; later
/// writes with a different dimension are rejected.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl VectorStore for MemoryStore {
    async fn insert_document(
        &self,
        doc: NewDocument,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<Uuid, StoreError> {
        let mut tables = self.write()?;
        let dims = validate_chunks(&chunks, tables.dimensions)?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let seq = tables.bump_seq();
        tables.documents.insert(
            id,
            DocRow {
                seq,
                doc,
                created_at: now,
                updated_at: now,
            },
        );
        tables.append_chunks(id, chunks);
        tables.dimensions = dims;
        tracing::debug!(document_id = %id, "memory_store_insert");
        Ok(id)
    }

    async fn update_document(
        &self,
        id: Uuid,
        doc: NewDocument,
        chunks: Option<Vec<EmbeddedChunk>>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.documents.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        let dims = match &chunks {
            Some(batch) => validate_chunks(batch, tables.dimensions)?,
            None => tables.dimensions,
        };
        let row = tables
            .documents
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        row.doc = doc;
        row.updated_at = Utc::now();
        if let Some(batch) = chunks {
            tables.chunks.retain(|c| c.document_id != id);
            tables.append_chunks(id, batch);
            tables.dimensions = dims;
        }
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .documents
            .get(&id)
            .map(|row| tables.document_view(id, row)))
    }

    async fn list_documents(
        &self,
        filter: &ChunkFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<(&Uuid, &DocRow)> = tables
            .documents
            .iter()
            .filter(|(_, row)| {
                filter.matches(row.doc.subject.as_deref(), row.doc.grade_level.as_deref())
            })
            .collect();
        rows.sort_by(|a, b| b.1.seq.cmp(&a.1.seq));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(id, row)| tables.document_view(*id, row))
            .collect())
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let existed = tables.documents.remove(&id).is_some();
        if existed {
            tables.chunks.retain(|c| c.document_id != id);
            tracing::debug!(document_id = %id, "memory_store_delete");
        }
        Ok(existed)
    }

    async fn nearest_chunks(
        &self,
        query: &[f32],
        k: usize,
        filter: &ChunkFilter,
        metric: DistanceMetric,
        min_similarity: Option<f32>,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let tables = self.read()?;
        let mut scored: Vec<(f64, u64, ScoredChunk)> = Vec::new();
        for chunk in &tables.chunks {
            let Some(row) = tables.documents.get(&chunk.document_id) else {
                continue;
            };
            if !filter.matches(row.doc.subject.as_deref(), row.doc.grade_level.as_deref()) {
                continue;
            }
            let dist = metric::distance(metric, query, &chunk.embedding);
            if metric == DistanceMetric::Cosine {
                if let Some(threshold) = min_similarity {
                    if 1.0 - dist < f64::from(threshold) {
                        continue;
                    }
                }
            }
            scored.push((
                dist,
                chunk.seq,
                ScoredChunk {
                    document_id: chunk.document_id,
                    chunk_index: chunk.index,
                    text: chunk.text.clone(),
                    subject: row.doc.subject.clone(),
                    grade_level: row.doc.grade_level.clone(),
                    distance: dist,
                },
            ));
        }
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        Ok(scored.into_iter().map(|(_, _, chunk)| chunk).collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let tables = self.read()?;
        let mut stats = StoreStats {
            documents: tables.documents.len() as u64,
            chunks: tables.chunks.len() as u64,
            ..Default::default()
        };
        for row in tables.documents.values() {
            if let Some(subject) = &row.doc.subject {
                *stats.by_subject.entry(subject.clone()).or_insert(0) += 1;
            }
            if let Some(grade) = &row.doc.grade_level {
                *stats.by_grade_level.entry(grade.clone()).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }
}
