//! Board game rules assistant.
//!
//! Answers a rules question from the indexed rulebooks:
//! `rulebook "How much money does each player start with in Monopoly?"`

use clap::Parser;
use rulebook_cli::commands::QueryCommand;
use rulebook_core::{logging, AppResult};
use std::process::ExitCode;
use tracing::Instrument;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = QueryCommand::parse();

    match run(&cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Query failed: {}", e);
            println!("\n❌ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: &QueryCommand) -> AppResult<()> {
    let config = cmd.resolve_config()?;
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Store: {:?}", config.store_path);
    tracing::debug!("Model: {}", config.model);

    let mut stdout = std::io::stdout();
    cmd.execute(&config, &mut stdout)
        .instrument(tracing::info_span!("command", name = "query"))
        .await
}
