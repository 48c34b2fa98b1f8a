//! Test doubles shared by the crate-level tests.

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::index::SqliteIndex;
use crate::types::KnowledgeChunk;
use crate::vector_index::VectorIndex;
use rulebook_core::{AppError, AppResult};
use rulebook_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// LLM that replays canned replies and records every prompt it receives.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::new(10, 2),
                done: true,
            }),
            Some(Err(message)) => Err(AppError::Llm(message)),
            None => Err(AppError::Llm("no scripted reply left".to_string())),
        }
    }
}

/// Write chunks embedded with the trigram provider into a fresh index file.
///
/// Each entry is `(metadata id, text)`; `None` leaves the metadata without
/// an `id`.
pub async fn build_store(path: &Path, entries: &[(Option<&str>, &str)]) {
    let embedder = TrigramProvider::new(384);
    let index = SqliteIndex::open(path).unwrap();

    for (i, (id, text)) in entries.iter().enumerate() {
        let metadata = match id {
            Some(id) => serde_json::json!({ "id": id }),
            None => serde_json::json!({ "source": "loose-notes.txt" }),
        };
        index
            .upsert_chunk(&KnowledgeChunk {
                id: format!("row-{}", i),
                text: text.to_string(),
                embedding: Some(embedder.embed(text).await.unwrap()),
                metadata,
            })
            .unwrap();
    }
}
