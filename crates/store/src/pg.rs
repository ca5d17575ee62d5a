//! Postgres + pgvector backend.
//!
//! Documents and chunks live in two tables; chunk embeddings are a
//! `VECTOR(dims)` column and similarity search runs in SQL through the
//! pgvector distance operators. All multi-row writes go through a
//! transaction, and the `ON DELETE CASCADE` foreign key makes document
//! deletion take its chunks with it.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    ChunkFilter, DistanceMetric, Document, EmbeddedChunk, NewDocument, ScoredChunk, StoreStats,
};
use crate::{validate_chunks, VectorStore};

/// Connection settings for [`PgStore`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PgStoreConfig {
    /// Postgres connection string. The target database must allow
    /// `CREATE EXTENSION vector`.
    pub database_url: String,
    /// Connection pool cap.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Embedding dimension of the `VECTOR` column. Must match the
    /// embedder's output; changing it requires a fresh chunks table.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_max_connections() -> u32 {
    5
}

fn default_dimensions() -> usize {
    1536
}

impl Default for PgStoreConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/edurag".into(),
            max_connections: default_max_connections(),
            dimensions: default_dimensions(),
        }
    }
}

/// Postgres-backed [`VectorStore`].
pub struct PgStore {
    pool: PgPool,
    dimensions: usize,
}

impl PgStore {
    /// Connects to Postgres and ensures the schema (extension, tables,
    /// indexes) exists.
    pub async fn connect(cfg: &PgStoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect(&cfg.database_url)
            .await?;
        let store = Self {
            pool,
            dimensions: cfg.dimensions,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Wraps an existing pool; used by tests that manage their own
    /// connection.
    pub async fn with_pool(pool: PgPool, dimensions: usize) -> Result<Self, StoreError> {
        let store = Self { pool, dimensions };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                subject TEXT,
                grade_level TEXT,
                language TEXT NOT NULL,
                source TEXT,
                document_type TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                seq BIGSERIAL PRIMARY KEY,
                document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                chunk_index BIGINT NOT NULL,
                text TEXT NOT NULL,
                embedding VECTOR({dims}) NOT NULL,
                UNIQUE (document_id, chunk_index)
            )
            "#,
            dims = self.dimensions
        ))
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS chunks_document_id_idx ON chunks (document_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS documents_subject_idx ON documents (subject)")
            .execute(&self.pool)
            .await?;
        tracing::debug!(dimensions = self.dimensions, "pg_store_migrated");
        Ok(())
    }

    fn document_from_row(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
        Ok(Document {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            subject: row.try_get("subject")?,
            grade_level: row.try_get("grade_level")?,
            language: row.try_get("language")?,
            source: row.try_get("source")?,
            document_type: row.try_get("document_type")?,
            chunk_count: row.try_get::<i64, _>("chunk_count")? as u64,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_chunks(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        document_id: Uuid,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<(), StoreError> {
        for chunk in chunks {
            sqlx::query(
                "INSERT INTO chunks (document_id, chunk_index, text, embedding) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(document_id)
            .bind(chunk.index as i64)
            .bind(&chunk.text)
            .bind(pgvector::Vector::from(chunk.embedding))
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

const DOCUMENT_COLUMNS: &str = "d.id, d.title, d.content, d.subject, d.grade_level, d.language, \
     d.source, d.document_type, d.created_at, d.updated_at, \
     (SELECT COUNT(*) FROM chunks c WHERE c.document_id = d.id) AS chunk_count";

#[async_trait::async_trait]
impl VectorStore for PgStore {
    async fn insert_document(
        &self,
        doc: NewDocument,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<Uuid, StoreError> {
        validate_chunks(&chunks, Some(self.dimensions))?;
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO documents \
             (id, title, content, subject, grade_level, language, source, document_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.subject)
        .bind(&doc.grade_level)
        .bind(&doc.language)
        .bind(&doc.source)
        .bind(&doc.document_type)
        .execute(&mut *tx)
        .await?;
        Self::insert_chunks(&mut tx, id, chunks).await?;
        tx.commit().await?;
        tracing::debug!(document_id = %id, "pg_store_insert");
        Ok(id)
    }

    async fn update_document(
        &self,
        id: Uuid,
        doc: NewDocument,
        chunks: Option<Vec<EmbeddedChunk>>,
    ) -> Result<(), StoreError> {
        if let Some(batch) = &chunks {
            validate_chunks(batch, Some(self.dimensions))?;
        }
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE documents SET title = $2, content = $3, subject = $4, grade_level = $5, \
             language = $6, source = $7, document_type = $8, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.subject)
        .bind(&doc.grade_level)
        .bind(&doc.language)
        .bind(&doc.source)
        .bind(&doc.document_type)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        if let Some(batch) = chunks {
            sqlx::query("DELETE FROM chunks WHERE document_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_chunks(&mut tx, id, batch).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents d WHERE d.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::document_from_row).transpose()
    }

    async fn list_documents(
        &self,
        filter: &ChunkFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let mut sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents d");
        let mut conditions = Vec::new();
        let mut next_bind = 1;
        if filter.subject.is_some() {
            conditions.push(format!("d.subject = ${next_bind}"));
            next_bind += 1;
        }
        if filter.grade_level.is_some() {
            conditions.push(format!("d.grade_level = ${next_bind}"));
            next_bind += 1;
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY d.created_at DESC, d.id DESC LIMIT ${next_bind} OFFSET ${}",
            next_bind + 1
        ));

        let mut query = sqlx::query(&sql);
        if let Some(subject) = &filter.subject {
            query = query.bind(subject);
        }
        if let Some(grade) = &filter.grade_level {
            query = query.bind(grade);
        }
        let rows = query
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::document_from_row).collect()
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
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
        if query.len() != self.dimensions {
            return Err(StoreError::InvalidRecord(format!(
                "query vector has dimension {}, expected {}",
                query.len(),
                self.dimensions
            )));
        }
        let op = metric.pg_operator();
        let mut sql = format!(
            "SELECT c.document_id, c.chunk_index, c.text, d.subject, d.grade_level, \
             c.embedding {op} $1 AS distance \
             FROM chunks c JOIN documents d ON d.id = c.document_id"
        );
        let mut conditions = Vec::new();
        let mut next_bind = 2;
        if filter.subject.is_some() {
            conditions.push(format!("d.subject = ${next_bind}"));
            next_bind += 1;
        }
        if filter.grade_level.is_some() {
            conditions.push(format!("d.grade_level = ${next_bind}"));
            next_bind += 1;
        }
        let mut max_distance = None;
        if metric == DistanceMetric::Cosine {
            if let Some(threshold) = min_similarity {
                max_distance = Some(1.0 - f64::from(threshold));
                conditions.push(format!("c.embedding {op} $1 <= ${next_bind}"));
                next_bind += 1;
            }
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY distance ASC, c.seq ASC LIMIT ${next_bind}"
        ));

        let mut db_query = sqlx::query(&sql).bind(pgvector::Vector::from(query.to_vec()));
        if let Some(subject) = &filter.subject {
            db_query = db_query.bind(subject);
        }
        if let Some(grade) = &filter.grade_level {
            db_query = db_query.bind(grade);
        }
        if let Some(max) = max_distance {
            db_query = db_query.bind(max);
        }
        let rows = db_query.bind(k as i64).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(ScoredChunk {
                    document_id: row.try_get("document_id")?,
                    chunk_index: row.try_get::<i64, _>("chunk_index")? as usize,
                    text: row.try_get("text")?,
                    subject: row.try_get("subject")?,
                    grade_level: row.try_get("grade_level")?,
                    distance: row.try_get("distance")?,
                })
            })
            .collect()
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        let counts = sqlx::query(
            "SELECT (SELECT COUNT(*) FROM documents) AS documents, \
             (SELECT COUNT(*) FROM chunks) AS chunks",
        )
        .fetch_one(&self.pool)
        .await?;
        stats.documents = counts.try_get::<i64, _>("documents")? as u64;
        stats.chunks = counts.try_get::<i64, _>("chunks")? as u64;

        let by_subject = sqlx::query(
            "SELECT subject, COUNT(*) AS total FROM documents \
             WHERE subject IS NOT NULL GROUP BY subject",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &by_subject {
            stats.by_subject.insert(
                row.try_get("subject")?,
                row.try_get::<i64, _>("total")? as u64,
            );
        }

        let by_grade = sqlx::query(
            "SELECT grade_level, COUNT(*) AS total FROM documents \
             WHERE grade_level IS NOT NULL GROUP BY grade_level",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &by_grade {
            stats.by_grade_level.insert(
                row.try_get("grade_level")?,
                row.try_get::<i64, _>("total")? as u64,
            );
        }
        Ok(stats)
    }
}
