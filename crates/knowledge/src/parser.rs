//! Rulebook document reading.

use rulebook_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Form feed; separates pages in text extracted from PDFs.
pub const PAGE_BREAK: char = '\x0c';

/// Document kinds the indexer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    PlainText,
}

impl ContentType {
    /// Detect content type from file extension. Other files are not rulebooks.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Read a rulebook document as text.
pub fn read_document(path: &Path) -> AppResult<String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Store(format!("Failed to read {:?}: {}", path, e)))?;

    if raw.contains('\0') {
        return Err(AppError::Store(format!("{:?} looks like a binary file", path)));
    }

    Ok(raw)
}

/// Split a document into pages on form feed characters.
///
/// A document without form feeds is a single page. Pages keep their
/// position even when blank so page numbers stay stable.
pub fn split_pages(text: &str) -> Vec<&str> {
    text.split(PAGE_BREAK).collect()
}
