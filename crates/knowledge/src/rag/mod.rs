//! Retrieval-augmented answering and its evaluation harness.

pub mod eval;
pub mod query;

pub use eval::{parse_verdict, query_and_validate, AnswerJudge, EvalCase, EvalOutcome, RULEBOOK_CASES};
pub use query::{build_context, QueryResponse, QueryRunner, ScoredChunk, CONTEXT_SEPARATOR};
