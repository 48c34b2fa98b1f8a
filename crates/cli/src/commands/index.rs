//! Store building: the `rulebook-index` binary.

use clap::Parser;
use rulebook_core::{AppConfig, AppResult};
use rulebook_knowledge::{index_documents, IndexOptions, IndexStats};
use std::io::Write;
use std::path::PathBuf;

/// Build or update the rulebook vector store
#[derive(Parser, Debug)]
#[command(name = "rulebook-index")]
#[command(about = "Index rulebook text files into the vector store", long_about = None)]
#[command(version)]
pub struct IndexCommand {
    /// Directory of rulebook files (.txt, .md)
    #[arg(long, env = "RULEBOOK_DATA")]
    pub data: Option<PathBuf>,

    /// Vector store directory
    #[arg(long, env = "RULEBOOK_STORE")]
    pub store: Option<PathBuf>,

    /// Path to config file
    #[arg(long, env = "RULEBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Embedding provider (ollama, trigram)
    #[arg(long)]
    pub embedding_provider: Option<String>,

    /// Embedding model
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Clear the store before indexing
    #[arg(long)]
    pub reset: bool,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored log output (`NO_COLOR` is read with the rest of the environment)
    #[arg(long)]
    pub no_color: bool,
}

impl IndexCommand {
    /// Merge defaults, config file, environment and flags.
    pub fn resolve_config(&self) -> AppResult<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?.with_overrides(
            self.store.clone(),
            None,
            self.log_level.clone(),
            self.verbose,
            self.no_color,
        );

        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(provider) = &self.embedding_provider {
            config.embedding_provider = provider.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.embedding_model = model.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Index the data directory and print a summary to `out`.
    pub async fn execute<W: Write>(&self, config: &AppConfig, out: &mut W) -> AppResult<IndexStats> {
        let options = IndexOptions {
            data_path: config.data_path.clone(),
            reset: self.reset,
        };

        let stats = index_documents(config, options).await?;

        writeln!(
            out,
            "Indexed {} documents into {}: {} chunks added, {} already present ({} bytes in {:.2}s)",
            stats.documents,
            config.store_path.display(),
            stats.chunks_added,
            stats.chunks_skipped,
            stats.bytes_processed,
            stats.duration_secs
        )?;

        Ok(stats)
    }
}
