//! Record and query types shared by all store backends.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document as submitted for ingestion, before it has an identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDocument {
    /// Human-readable title.
    pub title: String,
    /// Full document text; the source of truth the chunks were cut from.
    pub content: String,
    /// Curriculum subject (e.g. "mathematics"), used as a retrieval filter.
    #[serde(default)]
    pub subject: Option<String>,
    /// Grade level (e.g. "8"), used as a retrieval filter.
    #[serde(default)]
    pub grade_level: Option<String>,
    /// BCP-47 language tag of the content.
    #[serde(default = "default_language")]
    pub language: String,
    /// Where the content came from (publisher, URL, upload).
    #[serde(default)]
    pub source: Option<String>,
    /// Free-form document category (textbook, notes, article).
    #[serde(default)]
    pub document_type: Option<String>,
}

fn default_language() -> String {
    "en-IN".into()
}

/// A stored document with its identity and bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub language: String,
    pub source: Option<String>,
    pub document_type: Option<String>,
    /// Number of chunks currently stored for this document.
    pub chunk_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A chunk ready for persistence: its position, text, and embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedChunk {
    /// Zero-based sequence index within the parent document.
    pub index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A chunk returned from nearest-neighbor search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    pub document_id: Uuid,
    pub chunk_index: usize,
    pub text: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    /// Distance to the query vector under the requested metric
    /// (smaller is nearer).
    pub distance: f64,
}

/// Metadata restriction applied to searches and listings. Empty filter
/// matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkFilter {
    /// Exact-match subject restriction.
    #[serde(default)]
    pub subject: Option<String>,
    /// Exact-match grade-level restriction.
    #[serde(default)]
    pub grade_level: Option<String>,
}

impl ChunkFilter {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.grade_level.is_none()
    }

    /// Whether a document's metadata satisfies this filter.
    pub fn matches(&self, subject: Option<&str>, grade_level: Option<&str>) -> bool {
        if let Some(want) = self.subject.as_deref() {
            if subject != Some(want) {
                return false;
            }
        }
        if let Some(want) = self.grade_level.as_deref() {
            if grade_level != Some(want) {
                return false;
            }
        }
        true
    }
}

/// Distance metric used for nearest-neighbor search.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance (`1 - cosine similarity`). The default; pairs with
    /// unit-normalized embeddings.
    #[default]
    Cosine,
    /// Euclidean (L2) distance.
    L2,
}

impl DistanceMetric {
    /// pgvector operator implementing this metric.
    pub fn pg_operator(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "<=>",
            DistanceMetric::L2 => "<->",
        }
    }
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: u64,
    pub chunks: u64,
    /// Document counts keyed by subject; documents without a subject are
    /// omitted.
    pub by_subject: BTreeMap<String, u64>,
    /// Document counts keyed by grade level.
    pub by_grade_level: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_defaults_language() {
        let doc: NewDocument = serde_json::from_str(
            r#"{"title": "Algebra", "content": "Variables and equations."}"#,
        )
        .unwrap();
        assert_eq!(doc.language, "en-IN");
        assert!(doc.subject.is_none());
    }

    #[test]
    fn filter_empty_matches_everything() {
        let filter = ChunkFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(None, None));
        assert!(filter.matches(Some("science"), Some("8")));
    }

    #[test]
    fn filter_subject_exact_match() {
        let filter = ChunkFilter {
            subject: Some("science".into()),
            grade_level: None,
        };
        assert!(filter.matches(Some("science"), None));
        assert!(!filter.matches(Some("history"), None));
        assert!(!filter.matches(None, None));
    }

    #[test]
    fn filter_combined_requires_both() {
        let filter = ChunkFilter {
            subject: Some("science".into()),
            grade_level: Some("8".into()),
        };
        assert!(filter.matches(Some("science"), Some("8")));
        assert!(!filter.matches(Some("science"), Some("9")));
        assert!(!filter.matches(Some("history"), Some("8")));
    }

    #[test]
    fn metric_default_is_cosine() {
        assert_eq!(DistanceMetric::default(), DistanceMetric::Cosine);
        assert_eq!(DistanceMetric::Cosine.pg_operator(), "<=>");
        assert_eq!(DistanceMetric::L2.pg_operator(), "<->");
    }

    #[test]
    fn metric_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DistanceMetric::Cosine).unwrap(),
            "\"cosine\""
        );
        let metric: DistanceMetric = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(metric, DistanceMetric::L2);
    }
}
