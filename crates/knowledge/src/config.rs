//! Store layout and persisted store configuration.
//!
//! A store is a directory holding `index.sqlite`, `config.yaml` and
//! `sources.jsonl`.

use crate::types::StoreConfig;
use rulebook_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the path to the SQLite index inside a store.
pub fn get_index_path(store: &Path) -> PathBuf {
    store.join("index.sqlite")
}

/// Get the path to the store config file.
pub fn get_config_path(store: &Path) -> PathBuf {
    store.join("config.yaml")
}

/// Get the path to the indexed-sources log.
pub fn get_sources_path(store: &Path) -> PathBuf {
    store.join("sources.jsonl")
}

/// Load the store configuration, if the store has one.
pub fn load_store_config(store: &Path) -> AppResult<Option<StoreConfig>> {
    let config_path = get_config_path(store);
    if !config_path.exists() {
        tracing::debug!("No store config at {:?}", config_path);
        return Ok(None);
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Store(format!("Failed to read store config at {:?}: {}", config_path, e))
    })?;

    let config: StoreConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Store(format!("Failed to parse store config at {:?}: {}", config_path, e))
    })?;

    Ok(Some(config))
}

/// Save the store configuration, creating the store directory if needed.
pub fn save_store_config(store: &Path, config: &StoreConfig) -> AppResult<()> {
    fs::create_dir_all(store)?;

    let config_path = get_config_path(store);
    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Store(format!("Failed to write store config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved store config to {:?}", config_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_store_layout() {
        let store = Path::new("store");
        assert_eq!(get_index_path(store), PathBuf::from("store/index.sqlite"));
        assert_eq!(get_config_path(store), PathBuf::from("store/config.yaml"));
        assert_eq!(get_sources_path(store), PathBuf::from("store/sources.jsonl"));
    }

    #[test]
    fn test_missing_config_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load_store_config(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("nested").join("store");

        let config = StoreConfig {
            embedding_provider: "trigram".to_string(),
            embedding_model: "trigram-v1".to_string(),
            embedding_dim: Some(384),
            last_indexed_at: Some(Utc::now()),
            ..Default::default()
        };
        save_store_config(&store, &config).unwrap();

        let loaded = load_store_config(&store).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_corrupt_config_is_store_error() {
        let temp = TempDir::new().unwrap();
        fs::write(get_config_path(temp.path()), "embedding_provider: [unclosed").unwrap();

        let result = load_store_config(temp.path());
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
