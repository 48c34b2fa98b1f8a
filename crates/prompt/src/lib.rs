//! Prompt system for the rulebook assistant.
//!
//! This crate provides:
//! - The fixed rules-answering and answer-evaluation templates
//! - Handlebars rendering with strict variable checking

pub mod builder;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use templates::{answer_eval, rules_qa, ANSWER_EVAL_TEMPLATE, RULES_QA_TEMPLATE};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
