//! Page-aware text chunking with configurable size and overlap.

use crate::parser::split_pages;
use crate::types::ChunkCandidate;
use rulebook_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Chunk a document into overlapping segments.
///
/// Each page (see [`split_pages`]) is split on its own so no chunk spans a
/// page break. Chunk ids are `<source>:<page>:<index within page>` and the
/// metadata carries the same id alongside `source` and `page`.
pub fn chunk_document(
    source: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<ChunkCandidate>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| {
            AppError::Config(format!(
                "Invalid chunking (size {}, overlap {}): {}",
                chunk_size, overlap, e
            ))
        })?;
    let splitter = TextSplitter::new(config);

    let mut candidates = Vec::new();
    for (page, page_text) in split_pages(text).into_iter().enumerate() {
        let pieces = splitter
            .chunks(page_text)
            .map(str::trim)
            .filter(|piece| !piece.is_empty());

        for (index, piece) in pieces.enumerate() {
            let id = format!("{}:{}:{}", source, page, index);
            let metadata = serde_json::json!({
                "id": &id,
                "source": source,
                "page": page,
            });
            candidates.push(ChunkCandidate {
                id,
                text: piece.to_string(),
                metadata,
            });
        }
    }

    tracing::debug!(
        "Chunked {} into {} chunks (size: {}, overlap: {})",
        source,
        candidates.len(),
        chunk_size,
        overlap
    );

    Ok(candidates)
}
