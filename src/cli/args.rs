//! Command line argument parsing and validation.
//!
//! Arguments are turned into a [`ReleaseConfig`] here; nothing in this module
//! touches the network.

use crate::error::{ConfigError, Result};
use crate::github::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL, RepoRef};
use crate::release::ReleaseConfig;
use clap::Parser;
use std::path::PathBuf;

/// Environment variable consulted when `--token` is absent or empty
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Create a GitHub release and upload files to it
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gh_release",
    version,
    about = "Create a GitHub release and upload assets to it",
    long_about = "Create a GitHub release and upload assets to it.

When --tag is not given, the highest semantic version among the repository's
existing tags is used (0.0.1 if there is none).

Usage:
  gh_release acme widgets dist/widgets-linux.tar.gz dist/widgets-macos.zip
  gh_release acme widgets --tag v1.2.0 --draft --assets=dist/widgets.tar.gz"
)]
pub struct Args {
    /// Organization or user that owns the repository
    #[arg(index = 1, value_name = "ORG")]
    pub org: String,

    /// Repository name
    #[arg(index = 2, value_name = "REPO")]
    pub repo: String,

    /// Files to upload as release assets
    #[arg(index = 3, value_name = "ASSETS")]
    pub assets: Vec<PathBuf>,

    /// File to upload as a release asset (repeatable)
    #[arg(long = "assets", value_name = "PATH")]
    pub asset_flags: Vec<PathBuf>,

    /// GitHub token. Checks $GITHUB_TOKEN if not provided
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Git tag. Uses latest published tag if not provided
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Release name. Uses tag if not provided
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Release body. Empty by default
    #[arg(long, value_name = "BODY", default_value = "")]
    pub body: String,

    /// Identify the release as a draft
    #[arg(long)]
    pub draft: bool,

    /// Identify the release as a prerelease
    #[arg(long)]
    pub prerelease: bool,

    /// GitHub API base URL
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// GitHub upload base URL
    #[arg(long, value_name = "URL", env = "GITHUB_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL)]
    pub upload_url: String,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (label, value) in [("org", &self.org), ("repo", &self.repo)] {
            if value.trim().is_empty() {
                return Err(format!("<{}> must not be empty", label));
            }
            if value.contains('/') {
                return Err(format!(
                    "<{}> must not contain '/': pass owner and repository separately",
                    label
                ));
            }
        }

        Ok(())
    }

    /// Token from `--token`, else from the environment value given.
    ///
    /// Empty strings count as absent.
    pub fn resolve_token(&self, env_token: Option<String>) -> Result<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| env_token.filter(|t| !t.is_empty()))
            .ok_or_else(|| ConfigError::MissingToken.into())
    }

    /// All asset paths, positional ones first
    pub fn asset_paths(&self) -> Vec<PathBuf> {
        self.assets
            .iter()
            .chain(self.asset_flags.iter())
            .cloned()
            .collect()
    }

    /// Build the release configuration
    pub fn to_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            repo: RepoRef::new(&self.org, &self.repo),
            tag: self.tag.clone().filter(|t| !t.is_empty()),
            name: self.name.clone().filter(|n| !n.is_empty()),
            body: self.body.clone(),
            draft: self.draft,
            prerelease: self.prerelease,
            assets: self.asset_paths(),
        }
    }
}
