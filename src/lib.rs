//! # gh_release
//!
//! Create a GitHub release and upload local files as its assets.
//!
//! When no tag is given, the release tag is the highest semantic version
//! among the repository's existing tags (`0.0.1` when none parse). Assets are
//! uploaded concurrently; a failed upload is reported but does not fail the
//! release.
//!
//! ## Usage
//!
//! ```bash
//! gh_release acme widgets dist/widgets-linux.tar.gz dist/widgets-macos.zip
//! gh_release acme widgets --tag v1.2.0 --draft --assets=dist/widgets.tar.gz
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod github;
pub mod release;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use github::{GitHubClient, GitHubReleaseManager, ReleaseApi, ReleaseHandle, ReleaseRequest, RepoRef};
pub use release::{ReleaseConfig, ReleaseOrchestrator, ReleaseOutcome, ReleasePhase};
