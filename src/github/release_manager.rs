//! GitHub Release management for coordinating release operations

use super::assets::{self, UploadReport};
use super::client::{ReleaseApi, RepoRef};
use super::tags;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed to create one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Target repository
    pub repo: RepoRef,
    /// Tag the release points at
    pub tag_name: String,
    /// Release title
    pub name: String,
    /// Release description
    pub body: String,
    /// Whether to create a draft release
    pub draft: bool,
    /// Whether to mark the release as a prerelease
    pub prerelease: bool,
}

/// Identifies a release created on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseHandle {
    /// Release ID, the key for asset uploads
    pub id: u64,
    /// Release URL
    pub html_url: String,
}

/// GitHub release manager
pub struct GitHubReleaseManager<C> {
    /// GitHub client, shared with upload tasks
    client: Arc<C>,
}

impl<C: ReleaseApi + 'static> GitHubReleaseManager<C> {
    /// Create new GitHub release manager
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Highest semantic version tagged in `repo`, or the floor version
    pub async fn latest_tag(&self, repo: &RepoRef) -> Result<String> {
        tags::resolve_latest_tag(self.client.as_ref(), repo).await
    }

    /// Create a GitHub release
    ///
    /// Issues exactly one create call. Any failure is returned as-is; nothing
    /// is retried.
    pub async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseHandle> {
        log::info!(
            "Creating release {:?} for {} with tag {}",
            request.name,
            request.repo,
            request.tag_name
        );

        let release = self.client.create_release(request).await?;

        log::info!("Created release {}", release.id);
        Ok(release)
    }

    /// Upload local files as assets of `release`
    ///
    /// Never fails as a whole; per-file failures are logged and returned in
    /// the report.
    pub async fn upload_artifacts(
        &self,
        repo: &RepoRef,
        release: &ReleaseHandle,
        artifact_paths: &[PathBuf],
    ) -> UploadReport {
        assets::upload_all(Arc::clone(&self.client), repo, release, artifact_paths).await
    }
}
