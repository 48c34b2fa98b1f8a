//! Configuration management for the rulebook assistant.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - A YAML config file (`--config`, or `rulebook.yaml` in the working directory)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "rulebook.yaml";

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Main application configuration.
///
/// Holds everything the query runner and the indexer need; nothing in the
/// library crates reads globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Directory holding the persisted vector store
    pub store_path: PathBuf,

    /// Directory of rulebook text files to index
    pub data_path: PathBuf,

    /// Base URL of the Ollama server
    pub ollama_url: String,

    /// Generative model used for answers and evaluation
    pub model: String,

    /// Embedding provider ("ollama", "trigram")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    store: Option<PathSection>,
    data: Option<PathSection>,
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PathSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    endpoint: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            store_path: PathBuf::from("store"),
            data_path: PathBuf::from("data"),
            ollama_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            top_k: 5,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, a YAML file and the environment.
    ///
    /// When `config_file` is `None`, `rulebook.yaml` in the working directory
    /// is merged if it exists. An explicitly named file must exist.
    ///
    /// Environment variables:
    /// - `RULEBOOK_STORE`: Vector store directory
    /// - `RULEBOOK_DATA`: Rulebook data directory
    /// - `RULEBOOK_MODEL`: Generative model
    /// - `RULEBOOK_EMBEDDING_MODEL`: Embedding model
    /// - `OLLAMA_URL`: Ollama base URL
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use rulebook_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Store: {:?}", config.store_path);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        Ok(config.apply_env(|key| std::env::var(key).ok()))
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(path) = config_file.store.and_then(|s| s.path) {
            result.store_path = PathBuf::from(path);
        }

        if let Some(path) = config_file.data.and_then(|d| d.path) {
            result.data_path = PathBuf::from(path);
        }

        if let Some(llm) = config_file.llm {
            if let Some(endpoint) = llm.endpoint {
                result.ollama_url = endpoint;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding_model = model;
            }
        }

        if let Some(top_k) = config_file.retrieval.and_then(|r| r.top_k) {
            result.top_k = top_k;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply environment overrides using the given variable lookup.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store) = lookup("RULEBOOK_STORE") {
            self.store_path = PathBuf::from(store);
        }

        if let Some(data) = lookup("RULEBOOK_DATA") {
            self.data_path = PathBuf::from(data);
        }

        if let Some(model) = lookup("RULEBOOK_MODEL") {
            self.model = model;
        }

        if let Some(model) = lookup("RULEBOOK_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }

        if let Some(url) = lookup("OLLAMA_URL") {
            self.ollama_url = url;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and the environment.
    pub fn with_overrides(
        mut self,
        store_path: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(store_path) = store_path {
            self.store_path = store_path;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model name cannot be empty".to_string()));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.store_path, PathBuf::from("store"));
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rulebook.yaml");
        std::fs::write(
            &path,
            r#"
store:
  path: /var/lib/rulebook
llm:
  endpoint: http://gpu-box:11434
  model: llama3.2
embedding:
  provider: trigram
retrieval:
  topK: 3
logging:
  level: info
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/var/lib/rulebook"));
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.embedding_provider, "trigram");
        // Unset keys keep their defaults
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.top_k, 3);
        assert_eq!(config.log_level, Some("info".to_string()));
        assert!(config.no_color);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yaml");
        std::fs::write(&path, "retrieval: [topK").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            ("RULEBOOK_STORE", "/tmp/store"),
            ("RULEBOOK_MODEL", "phi3"),
            ("OLLAMA_URL", "http://127.0.0.1:9999"),
            ("NO_COLOR", "1"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default().apply_env(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.store_path, PathBuf::from("/tmp/store"));
        assert_eq!(config.model, "phi3");
        assert_eq!(config.ollama_url, "http://127.0.0.1:9999");
        assert!(config.no_color);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some(PathBuf::from("other-store")),
            Some("llama3".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.store_path, PathBuf::from("other-store"));
        assert_eq!(overridden.model, "llama3");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_keeps_explicit_level() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("trace".to_string()),
            true,
            false,
        );
        assert_eq!(overridden.log_level, Some("trace".to_string()));
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.embedding_provider = "unknown".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
