pub mod cli;
pub mod config;
pub mod confirm;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod extract;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod translate;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing::info;

use cli::Cli;
use config::Config;
use executor::ExecutionResult;

/// How an invocation ended when no pipeline error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `--dry-run`: the command was printed, nothing ran.
    Printed,
    /// The user declined; nothing ran.
    Aborted,
    Executed(ExecutionResult),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Printed | Self::Aborted => 0,
            Self::Executed(result) => result.exit_code,
        }
    }
}

pub async fn run() -> Result<Outcome> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        model = ?cfg.model,
        timeout_secs = cfg.timeout_secs,
        max_tokens = cfg.max_tokens,
        shell = %cfg.shell,
        "loaded runtime configuration"
    );

    let credential = credentials::resolve(cli.provider)?;
    let input = cli.query_input()?;
    let query = translate::Query::parse(&input.text)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    let raw = translate::translate(&client, &cfg, &query, &credential).await?;
    let command = extract::extract(&raw)?;

    if cli.dry_run {
        println!("{command}");
        return Ok(Outcome::Printed);
    }

    if !confirm::confirm(&command, input.answer_source) {
        eprintln!("Aborted.");
        info!("user declined to run the command");
        return Ok(Outcome::Aborted);
    }

    let result = executor::run(&command, &cfg.shell).await;
    if !result.success() {
        eprintln!("lal: command exited with status {}", result.exit_code);
    }
    Ok(Outcome::Executed(result))
}
