//! Builds the vector store the `rulebook` binary reads.

use anyhow::Context;
use clap::Parser;
use rulebook_cli::commands::IndexCommand;
use rulebook_core::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = IndexCommand::parse();

    let config = cmd.resolve_config().context("Failed to load configuration")?;
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!(
        "Indexing {:?} into {:?} with {}/{}",
        config.data_path,
        config.store_path,
        config.embedding_provider,
        config.embedding_model
    );

    cmd.execute(&config, &mut std::io::stdout())
        .await
        .with_context(|| format!("Failed to index {:?}", config.data_path))?;

    Ok(())
}
