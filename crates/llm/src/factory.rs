//! LLM provider factory.
//!
//! Builds an `LlmClient` from a provider name and endpoint.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use crate::types::ProviderType;
use std::sync::Arc;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama")
/// * `endpoint` - Optional custom endpoint URL
///
/// # Errors
/// Returns error if the provider is not Ollama.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            tracing::debug!("Creating Ollama client for {}", base_url);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        None => Err(format!(
            "Unknown provider: {} (expected '{}')",
            provider,
            ProviderType::Ollama.as_str()
        )),
    }
}
