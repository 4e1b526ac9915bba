//! Command line interface for gh_release.
//!
//! Parses arguments, resolves the token, builds the GitHub client once and
//! hands a [`ReleaseConfig`](crate::release::ReleaseConfig) to the orchestrator.

mod args;
mod output;

pub use args::{Args, TOKEN_ENV};
pub use output::OutputManager;

use crate::error::{ConfigError, Result};
use crate::github::GitHubClient;
use crate::release::ReleaseOrchestrator;
use std::sync::Arc;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args, std::env::var(TOKEN_ENV).ok()).await
}

/// Run a release for already-parsed arguments.
///
/// `env_token` is the value of `GITHUB_TOKEN`, used when `--token` is empty.
/// Returns the process exit code; asset failures do not make it nonzero.
pub async fn execute(args: Args, env_token: Option<String>) -> Result<i32> {
    args.validate()
        .map_err(|reason| ConfigError::InvalidArguments { reason })?;

    let token = args.resolve_token(env_token)?;
    let client = Arc::new(GitHubClient::new(&token, &args.api_url, &args.upload_url)?);
    let config = args.to_config();

    let mut orchestrator = ReleaseOrchestrator::new(client);
    let outcome = orchestrator.run(&config).await?;

    let output = OutputManager::new();
    if let Err(e) = output.release_summary(&outcome) {
        log::warn!("Failed to print release summary: {}", e);
    }

    Ok(0)
}

