//! Vector index abstraction for rulebook chunks.

use crate::types::KnowledgeChunk;
use rulebook_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must be shareable across tasks; the query path only
/// needs `&self`.
pub trait VectorIndex: Send + Sync {
    /// Insert or update a chunk with its embedding.
    fn upsert_chunk(&self, chunk: &KnowledgeChunk) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns at most `top_k` chunks ordered by descending similarity.
    fn search(&self, query_embedding: &[f32], top_k: usize)
        -> AppResult<Vec<(KnowledgeChunk, f32)>>;

    /// Number of stored chunks.
    fn count(&self) -> AppResult<u64>;

    /// Whether a chunk with this id is stored.
    fn contains(&self, id: &str) -> AppResult<bool>;

    /// Remove all chunks.
    fn reset(&self) -> AppResult<()>;
}
