//! Query Runner: retrieve rulebook chunks and ask the model to answer.

use crate::config::{get_index_path, load_store_config};
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::index::SqliteIndex;
use crate::types::KnowledgeChunk;
use crate::vector_index::VectorIndex;
use rulebook_core::{AppConfig, AppError, AppResult};
use rulebook_llm::{create_client, LlmClient, LlmRequest};
use rulebook_prompt::{build_prompt, rules_qa};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Separator placed between retrieved chunk texts in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// A retrieved chunk with its similarity score.
pub type ScoredChunk = (KnowledgeChunk, f32);

/// Answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Raw model output
    pub answer: String,

    /// One citation per retrieved chunk, in retrieval order
    pub sources: Vec<String>,
}

/// Answers rulebook questions from a vector store.
pub struct QueryRunner {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmClient>,
    model: String,
    top_k: usize,
}

impl QueryRunner {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            model: model.into(),
            top_k,
        }
    }

    /// Open the configured store read-only and connect to Ollama.
    ///
    /// Queries embed with the provider and model recorded in the store, so
    /// they match the vectors it holds. A store without `config.yaml` falls
    /// back to the application settings.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = config.store_path.as_path();
        let index = SqliteIndex::open_read_only(&get_index_path(store))?;

        let embedding_config = match load_store_config(store)? {
            Some(store_config) => {
                EmbeddingConfig::from_store_config(&store_config, &config.ollama_url)
            }
            None => EmbeddingConfig::from_app_config(config),
        };
        let embedder = create_provider(&embedding_config)?;

        let llm = create_client("ollama", Some(&config.ollama_url)).map_err(AppError::Llm)?;

        tracing::debug!(
            "Query runner ready: store={:?} embedder={}/{} model={} top_k={}",
            store,
            embedder.provider_name(),
            embedder.model_name(),
            config.model,
            config.top_k
        );

        Ok(Self::new(
            embedder,
            Arc::new(index),
            llm,
            config.model.clone(),
            config.top_k,
        ))
    }

    /// Model used to answer.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Shared LLM client, for callers that reuse it (the evaluator does).
    pub fn llm(&self) -> Arc<dyn LlmClient> {
        Arc::clone(&self.llm)
    }

    /// Embed the question and fetch the `top_k` closest chunks.
    pub async fn retrieve(&self, question: &str) -> AppResult<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(question).await?;
        let results = self.index.search(&query_embedding, self.top_k)?;

        tracing::info!(
            "Retrieved {} chunks (top score: {:.3})",
            results.len(),
            results.first().map(|(_, score)| *score).unwrap_or(0.0)
        );

        Ok(results)
    }

    /// Render the prompt from retrieved chunks and ask the model.
    pub async fn generate(&self, question: &str, results: &[ScoredChunk]) -> AppResult<QueryResponse> {
        let chunks: Vec<&KnowledgeChunk> = results.iter().map(|(chunk, _)| chunk).collect();

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), build_context(&chunks));
        vars.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(&rules_qa(), vars)?;

        let request = LlmRequest::new(prompt.text, self.model.clone());
        let response = self.llm.complete(&request).await?;

        tracing::debug!(
            "Model {} answered ({} prompt / {} completion tokens)",
            response.model,
            response.usage.prompt_tokens,
            response.usage.completion_tokens
        );

        Ok(QueryResponse {
            answer: response.content,
            sources: chunks.iter().map(|chunk| chunk.source_id()).collect(),
        })
    }

    /// Retrieve then generate.
    pub async fn query(&self, question: &str) -> AppResult<QueryResponse> {
        let results = self.retrieve(question).await?;
        self.generate(question, &results).await
    }
}

/// Join chunk texts with [`CONTEXT_SEPARATOR`].
pub fn build_context(chunks: &[&KnowledgeChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
