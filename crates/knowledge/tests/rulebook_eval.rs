//! Smoke evaluation against a live Ollama server and a populated store.
//!
//! Build the store first (`rulebook-index`), then run with
//! `RULEBOOK_STORE=/abs/path/to/store cargo test -p rulebook-knowledge --test rulebook_eval -- --nocapture`.
//! The test returns early when Ollama or the store is unavailable.

use rulebook_core::AppConfig;
use rulebook_knowledge::config::get_index_path;
use rulebook_knowledge::{query_and_validate, AnswerJudge, QueryRunner, RULEBOOK_CASES};
use std::io::IsTerminal;
use std::time::Duration;

async fn ollama_running(base_url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    client
        .get(format!("{}/api/tags", base_url.trim_end_matches('/')))
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_rulebook_cases() {
    let config = AppConfig::load(None).unwrap();

    if !get_index_path(&config.store_path).exists() {
        println!("Skipping: no vector store at {:?}", config.store_path);
        return;
    }
    if !ollama_running(&config.ollama_url).await {
        println!("Skipping: Ollama not running at {}", config.ollama_url);
        return;
    }

    let runner = QueryRunner::from_config(&config).unwrap();
    let judge = AnswerJudge::for_runner(&runner);
    let color = !config.no_color && std::io::stdout().is_terminal();

    let mut failed = Vec::new();
    for case in &RULEBOOK_CASES {
        let outcome = query_and_validate(&runner, &judge, case).await;
        println!("\n{}", outcome.report(color));
        if !outcome.passed() {
            failed.push(case.name);
        }
    }

    assert!(failed.is_empty(), "failed cases: {:?}", failed);
}
