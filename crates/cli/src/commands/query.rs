//! Question answering: the `rulebook` binary.

use crate::output::{finish_step, format_response, start_step};
use clap::Parser;
use rulebook_core::{AppConfig, AppResult};
use rulebook_knowledge::QueryRunner;
use std::io::Write;
use std::path::PathBuf;

/// Board Game Rules Assistant
#[derive(Parser, Debug)]
#[command(name = "rulebook")]
#[command(about = "Board Game Rules Assistant", long_about = None)]
#[command(version)]
pub struct QueryCommand {
    /// The question about board game rules
    pub query_text: String,

    /// Show detailed information (debug logs on stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, env = "RULEBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vector store directory
    #[arg(long, env = "RULEBOOK_STORE")]
    pub store: Option<PathBuf>,

    /// Ollama model used to answer
    #[arg(long, env = "RULEBOOK_MODEL")]
    pub model: Option<String>,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,

    /// Disable colored log output (`NO_COLOR` is read with the rest of the environment)
    #[arg(long)]
    pub no_color: bool,
}

impl QueryCommand {
    /// Merge defaults, config file, environment and flags.
    pub fn resolve_config(&self) -> AppResult<AppConfig> {
        let config = AppConfig::load(self.config.as_deref())?.with_overrides(
            self.store.clone(),
            self.model.clone(),
            self.log_level.clone(),
            self.verbose,
            self.no_color,
        );
        config.validate()?;
        Ok(config)
    }

    /// Answer the question, writing progress and the formatted answer to `out`.
    pub async fn execute<W: Write>(&self, config: &AppConfig, out: &mut W) -> AppResult<()> {
        tracing::info!("Answering: {}", self.query_text);

        start_step(out, "🔍 Searching rulebooks...")?;
        let runner = QueryRunner::from_config(config)?;
        let results = runner.retrieve(&self.query_text).await?;
        finish_step(out)?;

        start_step(out, "🤖 Generating response...")?;
        let response = runner.generate(&self.query_text, &results).await?;
        finish_step(out)?;

        writeln!(out, "{}", format_response(&response.answer, &response.sources))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_core::AppError;
    use tempfile::TempDir;

    #[test]
    fn test_parse_question_and_verbose() {
        let cmd = QueryCommand::try_parse_from([
            "rulebook",
            "How much money does each player start with?",
            "-v",
        ])
        .unwrap();

        assert_eq!(cmd.query_text, "How much money does each player start with?");
        assert!(cmd.verbose);
    }

    #[test]
    fn test_parse_long_flags() {
        let cmd = QueryCommand::try_parse_from([
            "rulebook",
            "--verbose",
            "--store",
            "/tmp/rules-store",
            "--model",
            "llama3.2",
            "Who goes first?",
        ])
        .unwrap();

        assert!(cmd.verbose);
        assert_eq!(cmd.store, Some(PathBuf::from("/tmp/rules-store")));
        assert_eq!(cmd.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_no_color_env_any_value() {
        // Convention: any non-empty value disables colour
        std::env::set_var("NO_COLOR", "1");

        let cmd = QueryCommand::try_parse_from(["rulebook", "How much money does each player start with?"]).unwrap();
        assert!(!cmd.no_color);
        assert!(cmd.resolve_config().unwrap().no_color);
    }

    #[test]
    fn test_question_is_required() {
        assert!(QueryCommand::try_parse_from(["rulebook"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cmd = QueryCommand::try_parse_from([
            "rulebook",
            "--store",
            "elsewhere",
            "--model",
            "llama3.2",
            "-v",
            "q",
        ])
        .unwrap();

        let config = cmd.resolve_config().unwrap();
        assert_eq!(config.store_path, PathBuf::from("elsewhere"));
        assert_eq!(config.model, "llama3.2");
        assert!(config.verbose);
        assert!(config.log_level.is_some());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cmd = QueryCommand::try_parse_from([
            "rulebook",
            "--config",
            "/nonexistent/rulebook.yaml",
            "q",
        ])
        .unwrap();

        assert!(matches!(cmd.resolve_config(), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_store_fails_after_search_banner() {
        let temp = TempDir::new().unwrap();
        let cmd = QueryCommand::try_parse_from(["rulebook", "Who goes first?"]).unwrap();
        let config = AppConfig {
            store_path: temp.path().join("store"),
            ..Default::default()
        };

        let mut out = Vec::new();
        let result = cmd.execute(&config, &mut out).await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(String::from_utf8(out).unwrap(), "🔍 Searching rulebooks...");
    }
}
