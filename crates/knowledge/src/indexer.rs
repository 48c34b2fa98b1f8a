//! Builds the vector store from a directory of rulebook documents.

use crate::chunker::chunk_document;
use crate::config::{get_index_path, load_store_config, save_store_config};
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::index::SqliteIndex;
use crate::parser::{read_document, ContentType};
use crate::sources::SourceLog;
use crate::types::{IndexOptions, IndexStats, IndexedSource, KnowledgeChunk, StoreConfig};
use crate::vector_index::VectorIndex;
use chrono::Utc;
use rulebook_core::{AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Index every rulebook under `options.data_path` into the configured store.
///
/// Chunks whose id is already stored are skipped, so re-running after adding
/// a document only embeds the new chunks.
pub async fn index_documents(config: &AppConfig, options: IndexOptions) -> AppResult<IndexStats> {
    let start = Instant::now();
    let store = config.store_path.as_path();

    tracing::info!(
        "Indexing {:?} into store {:?} (reset: {})",
        options.data_path,
        store,
        options.reset
    );

    if !options.data_path.is_dir() {
        return Err(AppError::Config(format!(
            "Data directory {:?} does not exist",
            options.data_path
        )));
    }

    let index = SqliteIndex::open(&get_index_path(store))?;
    let sources = SourceLog::new(store);

    let existing = if options.reset {
        index.reset()?;
        sources.clear()?;
        None
    } else {
        load_store_config(store)?
    };

    let mut store_config = resolve_store_config(config, existing)?;
    let embedder = create_provider(&EmbeddingConfig::from_store_config(
        &store_config,
        &config.ollama_url,
    ))?;

    let mut stats = IndexStats::default();
    for path in collect_documents(&options.data_path) {
        let text = match read_document(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let source = path.display().to_string();
        let (added, skipped) = index_document(
            &index,
            embedder.as_ref(),
            &mut store_config,
            &source,
            &text,
        )
        .await?;

        stats.documents += 1;
        stats.chunks_added += added;
        stats.chunks_skipped += skipped;
        stats.bytes_processed += text.len() as u64;

        if added > 0 {
            sources.record(&IndexedSource {
                path: source,
                indexed_at: Utc::now(),
                chunk_count: added,
                byte_count: text.len() as u64,
            })?;
        }
    }

    store_config.last_indexed_at = Some(Utc::now());
    save_store_config(store, &store_config)?;

    stats.duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        "Indexed {} documents: {} chunks added, {} skipped, {} bytes in {:.2}s",
        stats.documents,
        stats.chunks_added,
        stats.chunks_skipped,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Store settings for this run.
///
/// An existing store keeps its embedding settings; asking for a different
/// provider or model is refused so vectors from two models never mix.
fn resolve_store_config(
    config: &AppConfig,
    existing: Option<StoreConfig>,
) -> AppResult<StoreConfig> {
    match existing {
        Some(store) => {
            if store.embedding_provider != config.embedding_provider
                || store.embedding_model != config.embedding_model
            {
                return Err(AppError::Config(format!(
                    "Store was built with {}/{} but {}/{} is configured. Re-run with --reset to rebuild it.",
                    store.embedding_provider,
                    store.embedding_model,
                    config.embedding_provider,
                    config.embedding_model
                )));
            }
            Ok(store)
        }
        None => Ok(StoreConfig {
            embedding_provider: config.embedding_provider.clone(),
            embedding_model: config.embedding_model.clone(),
            ..Default::default()
        }),
    }
}

/// Rulebook files under `data`, in a stable order.
fn collect_documents(data: &Path) -> Vec<PathBuf> {
    WalkDir::new(data)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| ContentType::from_path(path).is_some())
        .collect()
}

/// Chunk, embed and store one document. Returns (added, skipped).
async fn index_document(
    index: &SqliteIndex,
    embedder: &dyn EmbeddingProvider,
    store_config: &mut StoreConfig,
    source: &str,
    text: &str,
) -> AppResult<(u32, u32)> {
    let candidates = chunk_document(
        source,
        text,
        store_config.chunk_size,
        store_config.chunk_overlap,
    )?;

    let mut fresh = Vec::new();
    let mut skipped = 0u32;
    for candidate in candidates {
        if index.contains(&candidate.id)? {
            skipped += 1;
        } else {
            fresh.push(candidate);
        }
    }

    if fresh.is_empty() {
        tracing::debug!("{}: nothing new ({} chunks already stored)", source, skipped);
        return Ok((0, skipped));
    }

    let texts: Vec<String> = fresh.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != fresh.len() {
        return Err(AppError::Embedding(format!(
            "Expected {} embeddings, got {}",
            fresh.len(),
            embeddings.len()
        )));
    }

    let mut added = 0u32;
    for (candidate, embedding) in fresh.into_iter().zip(embeddings) {
        match store_config.embedding_dim {
            Some(dim) if dim != embedding.len() => {
                return Err(AppError::Embedding(format!(
                    "Embedding dimension changed: store has {}, model returned {}",
                    dim,
                    embedding.len()
                )));
            }
            Some(_) => {}
            None => store_config.embedding_dim = Some(embedding.len()),
        }

        index.upsert_chunk(&KnowledgeChunk {
            id: candidate.id,
            text: candidate.text,
            embedding: Some(embedding),
            metadata: candidate.metadata,
        })?;
        added += 1;
    }

    tracing::debug!("{}: {} chunks added, {} skipped", source, added, skipped);
    Ok((added, skipped))
}
