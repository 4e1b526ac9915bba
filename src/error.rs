//! Error types for gh_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.
//! Fatal errors (configuration, transport) bubble up to `main` as
//! [`ReleaseError`]. Version parse errors are skipped by the tag resolver and
//! [`AssetError`]s stay inside the upload report; neither ends the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gh_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all gh_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration and CLI errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version parsing errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// GitHub API and transport errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),
}

/// Configuration errors, raised before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No token on the command line or in the environment
    #[error("github token is required")]
    MissingToken,

    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Base URL for the API could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Reason for the error
        reason: String,
    },
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version parsing failed
    #[error("Failed to parse version '{version}': {source}")]
    ParseFailed {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// GitHub API errors. Every variant is fatal when raised while resolving
/// tags or creating the release.
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientInit(String),

    /// Request never produced a response
    #[error("{operation} request failed: {source}")]
    Request {
        /// Operation being attempted
        operation: &'static str,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// GitHub answered with a non-success status
    #[error("{operation} failed with HTTP {status}: {message}")]
    Status {
        /// Operation being attempted
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("{operation} returned an unreadable response: {source}")]
    Decode {
        /// Operation being attempted
        operation: &'static str,
        /// Underlying decode error
        #[source]
        source: reqwest::Error,
    },
}

/// Errors scoped to a single asset upload
#[derive(Error, Debug)]
pub enum AssetError {
    /// Local file could not be opened or inspected
    #[error("could not open {path}: {source}")]
    Open {
        /// Local path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Path has no usable file name
    #[error("invalid asset file name: {path}")]
    InvalidName {
        /// Local path
        path: PathBuf,
    },

    /// Upload request failed
    #[error("could not upload {path}: {source}")]
    Upload {
        /// Local path
        path: PathBuf,
        /// Underlying GitHub error
        #[source]
        source: GitHubError,
    },

    /// Upload task panicked or was aborted
    #[error("upload task for {path} did not complete: {reason}")]
    TaskFailed {
        /// Local path
        path: PathBuf,
        /// Join error message
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::MissingToken) => vec![
                "Pass a token with --token <token>".to_string(),
                "Or export GITHUB_TOKEN before running".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::Status { status: 401, .. }) => vec![
                "Verify the token is valid and not expired".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::Status { status: 403 | 404, .. }) => vec![
                "Check that <org>/<repo> exists and the token can access it".to_string(),
                "Creating releases requires the 'repo' scope (or contents: write)".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::Status { status: 422, .. }) => vec![
                "A release for this tag may already exist".to_string(),
                "Pass --tag explicitly to choose a different tag".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::Request { .. }) => vec![
                "Check network connectivity to the GitHub API".to_string(),
                "Verify --api-url / GITHUB_API_URL if using GitHub Enterprise".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
