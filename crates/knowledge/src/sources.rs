//! Indexed-document log (`sources.jsonl`).

use crate::config::get_sources_path;
use crate::types::IndexedSource;
use rulebook_core::{AppError, AppResult};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Appends and reads the per-store document log.
pub struct SourceLog {
    path: PathBuf,
}

impl SourceLog {
    pub fn new(store: &Path) -> Self {
        Self {
            path: get_sources_path(store),
        }
    }

    /// Append one document record.
    pub fn record(&self, source: &IndexedSource) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::Store(format!("Failed to open sources.jsonl: {}", e)))?;

        let line = serde_json::to_string(source)?;
        writeln!(file, "{}", line)
            .map_err(|e| AppError::Store(format!("Failed to write to sources.jsonl: {}", e)))?;
        file.sync_all()
            .map_err(|e| AppError::Store(format!("Failed to sync sources.jsonl: {}", e)))?;

        tracing::debug!("Recorded source: {}", source.path);
        Ok(())
    }

    /// Read all records, oldest first.
    pub fn list(&self) -> AppResult<Vec<IndexedSource>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| AppError::Store(format!("Failed to open sources.jsonl: {}", e)))?;

        let mut sources = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let source: IndexedSource = serde_json::from_str(&line).map_err(|e| {
                AppError::Store(format!(
                    "Failed to parse line {} in sources.jsonl: {}",
                    line_num + 1,
                    e
                ))
            })?;
            sources.push(source);
        }

        Ok(sources)
    }

    /// Delete the log.
    pub fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::debug!("Cleared sources.jsonl");
        }
        Ok(())
    }
}
