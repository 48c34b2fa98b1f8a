//! Embedding configuration.

use crate::types::StoreConfig;
use rulebook_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Dimension used by the trigram provider unless configured otherwise.
pub const DEFAULT_TRIGRAM_DIMENSIONS: usize = 384;

/// Embedding configuration for a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Expected vector dimension; `None` accepts whatever the model returns
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Ollama base URL
    pub endpoint: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: None,
            endpoint: "http://localhost:11434".to_string(),
        }
    }
}

impl EmbeddingConfig {
    /// Embedding settings from application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            dimensions: None,
            endpoint: config.ollama_url.clone(),
        }
    }

    /// Embedding settings recorded in an existing store.
    ///
    /// The store decides provider, model and dimension; the endpoint comes
    /// from application config.
    pub fn from_store_config(store: &StoreConfig, endpoint: &str) -> Self {
        Self {
            provider: store.embedding_provider.clone(),
            model: store.embedding_model.clone(),
            dimensions: store.embedding_dim,
            endpoint: endpoint.to_string(),
        }
    }
}
