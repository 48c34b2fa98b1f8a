//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder citation for chunks whose metadata carries no `id`.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Configuration persisted alongside a vector store (`config.yaml`).
///
/// Records how the stored embeddings were produced so that queries embed
/// with the same provider, model and dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Embedding provider used to build the store
    pub embedding_provider: String,

    /// Embedding model used to build the store
    pub embedding_model: String,

    /// Embedding vector dimension (known after the first chunk is embedded)
    #[serde(default)]
    pub embedding_dim: Option<usize>,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// When the store was last written
    #[serde(default)]
    pub last_indexed_at: Option<DateTime<Utc>>,
}

fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    80
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dim: None,
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            last_indexed_at: None,
        }
    }
}

/// A rulebook document recorded in `sources.jsonl` after indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Document path as given to the indexer
    pub path: String,

    /// When this document was indexed
    pub indexed_at: DateTime<Utc>,

    /// Number of chunks added from this document in that run
    pub chunk_count: u32,

    /// Document size in bytes
    pub byte_count: u64,
}

/// A text chunk with embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk identifier (`<path>:<page>:<chunk>` when built by the indexer)
    pub id: String,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Metadata object; the `id` field is used for citations
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl KnowledgeChunk {
    /// Citation for this chunk: metadata `id`, or [`UNKNOWN_SOURCE`].
    ///
    /// Non-string ids are cited in their JSON text form.
    pub fn source_id(&self) -> String {
        match self.metadata.get("id") {
            Some(serde_json::Value::String(id)) => id.clone(),
            Some(serde_json::Value::Null) | None => UNKNOWN_SOURCE.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Options for an indexing run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Directory of rulebook documents
    pub data_path: PathBuf,

    /// Clear the store before indexing
    pub reset: bool,
}

/// Statistics from an indexing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents read
    pub documents: u32,

    /// Number of new chunks embedded and stored
    pub chunks_added: u32,

    /// Number of chunks already present and skipped
    pub chunks_skipped: u32,

    /// Total bytes read
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Chunk candidate before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_with_metadata(metadata: serde_json::Value) -> KnowledgeChunk {
        KnowledgeChunk {
            id: "row-1".to_string(),
            text: "Collect $200 salary as you pass GO.".to_string(),
            embedding: None,
            metadata,
        }
    }

    #[test]
    fn test_source_id_from_metadata() {
        let chunk = chunk_with_metadata(serde_json::json!({"id": "data/monopoly.txt:2:0"}));
        assert_eq!(chunk.source_id(), "data/monopoly.txt:2:0");
    }

    #[test]
    fn test_source_id_placeholder() {
        assert_eq!(chunk_with_metadata(serde_json::json!({})).source_id(), "Unknown source");
        assert_eq!(
            chunk_with_metadata(serde_json::json!({"source": "data/monopoly.txt"})).source_id(),
            "Unknown source"
        );
        assert_eq!(chunk_with_metadata(serde_json::Value::Null).source_id(), "Unknown source");
        assert_eq!(
            chunk_with_metadata(serde_json::json!({"id": null})).source_id(),
            "Unknown source"
        );
    }

    #[test]
    fn test_source_id_non_string() {
        assert_eq!(chunk_with_metadata(serde_json::json!({"id": 42})).source_id(), "42");
        assert_eq!(chunk_with_metadata(serde_json::json!({"id": true})).source_id(), "true");
        assert_eq!(
            chunk_with_metadata(serde_json::json!({"id": ["rules", 3]})).source_id(),
            r#"["rules",3]"#
        );
    }

    #[test]
    fn test_store_config_defaults_from_partial_yaml() {
        let config: StoreConfig = serde_yaml::from_str(
            "embedding_provider: trigram\nembedding_model: trigram-v1\n",
        )
        .unwrap();

        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 80);
        assert_eq!(config.embedding_dim, None);
        assert!(config.last_indexed_at.is_none());
    }
}
