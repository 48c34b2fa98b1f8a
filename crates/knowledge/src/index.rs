//! SQLite-backed vector index for rulebook chunks.
//!
//! Embeddings are stored as little-endian `f32` blobs and ranked by cosine
//! similarity in process.

use crate::types::KnowledgeChunk;
use crate::vector_index::VectorIndex;
use rulebook_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT
);
"#;

/// Vector index stored in a single SQLite file.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open (or create) an index for writing.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Store(format!("Failed to create store directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an existing index for queries.
    ///
    /// Fails with a store error if the index has not been built.
    pub fn open_read_only(db_path: &Path) -> AppResult<Self> {
        if !db_path.exists() {
            return Err(AppError::Store(format!(
                "No vector store at {:?}. Run 'rulebook-index' first.",
                db_path
            )));
        }

        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite index: {}", e)))?;

        let has_chunks: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='chunks'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Store(format!("Failed to inspect index: {}", e)))?;

        if has_chunks.is_none() {
            return Err(AppError::Store(format!(
                "Vector store at {:?} is not initialized. Run 'rulebook-index' first.",
                db_path
            )));
        }

        tracing::debug!("Opened SQLite index read-only at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("SQLite connection lock poisoned".to_string()))
    }
}

impl VectorIndex for SqliteIndex {
    fn upsert_chunk(&self, chunk: &KnowledgeChunk) -> AppResult<()> {
        let embedding = chunk
            .embedding
            .as_ref()
            .ok_or_else(|| AppError::Store(format!("Chunk '{}' missing embedding", chunk.id)))?;
        let embedding_bytes = embedding_to_bytes(embedding);
        let metadata_json = serde_json::to_string(&chunk.metadata)?;

        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO chunks (id, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4)",
                params![chunk.id, chunk.text, embedding_bytes, metadata_json],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert chunk: {}", e)))?;

        Ok(())
    }

    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(KnowledgeChunk, f32)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text, embedding, metadata FROM chunks")
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("Failed to query chunks: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (id, text, embedding_bytes, metadata_json) =
                row.map_err(|e| AppError::Store(format!("Failed to read chunk: {}", e)))?;

            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let metadata = match metadata_json {
                Some(json) => serde_json::from_str(&json)?,
                None => serde_json::Value::Null,
            };

            let mut score = cosine_similarity(query_embedding, &embedding);
            // NaN vectors rank below every real match
            if score.is_nan() {
                score = f32::NEG_INFINITY;
            }
            results.push((
                KnowledgeChunk {
                    id,
                    text,
                    embedding: Some(embedding),
                    metadata,
                },
                score,
            ));
        }

        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn count(&self) -> AppResult<u64> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u64)
            })
            .map_err(|e| AppError::Store(format!("Failed to count chunks: {}", e)))
    }

    fn contains(&self, id: &str) -> AppResult<bool> {
        let found: Option<i64> = self
            .lock()?
            .query_row("SELECT 1 FROM chunks WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| AppError::Store(format!("Failed to look up chunk: {}", e)))?;

        Ok(found.is_some())
    }

    fn reset(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Store(format!("Failed to delete chunks: {}", e)))?;

        tracing::info!("Reset vector store");
        Ok(())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Store(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
