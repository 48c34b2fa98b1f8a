//! Rulebook knowledge store and retrieval-augmented answering.
//!
//! Provides local-first RAG over board-game rulebooks using SQLite and
//! Ollama embeddings:
//! - [`indexer`] builds the store from a directory of rulebooks
//! - [`rag::QueryRunner`] answers questions from it
//! - [`rag::eval`] grades answers against known expectations

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod indexer;
pub mod parser;
pub mod rag;
pub mod sources;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use index::SqliteIndex;
pub use indexer::index_documents;
pub use rag::{
    query_and_validate, AnswerJudge, EvalCase, EvalOutcome, QueryResponse, QueryRunner,
    RULEBOOK_CASES,
};
pub use types::{IndexOptions, IndexStats, IndexedSource, KnowledgeChunk, StoreConfig};
pub use vector_index::VectorIndex;
