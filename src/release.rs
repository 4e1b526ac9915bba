//! Release orchestration: resolve tag, create release, upload assets.
//!
//! Phases run strictly in order. A failure while resolving the tag or
//! creating the release aborts the run; upload failures do not.

use crate::error::Result;
use crate::github::{
    GitHubReleaseManager, ReleaseApi, ReleaseHandle, ReleaseRequest, RepoRef, UploadReport,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Validated configuration for one release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Target repository
    pub repo: RepoRef,
    /// Explicit tag; resolved from existing tags when `None` or empty
    pub tag: Option<String>,
    /// Explicit release title; defaults to the tag
    pub name: Option<String>,
    /// Release description
    pub body: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
    /// Local files to attach
    pub assets: Vec<PathBuf>,
}

/// Phase of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleasePhase {
    /// Nothing done yet
    Start,
    /// Tag chosen; fixed for the rest of the run
    TagResolved,
    /// Release exists on GitHub
    ReleaseCreated,
    /// Upload tasks spawned
    UploadsDispatched,
    /// All upload tasks finished (successfully or not)
    UploadsComplete,
    /// Tag resolution or release creation failed
    Aborted,
}

/// Result of a completed run
#[derive(Debug)]
pub struct ReleaseOutcome {
    /// Tag the release was created with
    pub tag: String,
    /// Release title
    pub name: String,
    /// Created release
    pub release: ReleaseHandle,
    /// Per-asset results
    pub uploads: UploadReport,
}

/// Drives one release through its phases
pub struct ReleaseOrchestrator<C> {
    manager: GitHubReleaseManager<C>,
    phase: ReleasePhase,
}

impl<C: ReleaseApi + 'static> ReleaseOrchestrator<C> {
    /// Create an orchestrator around a shared client
    pub fn new(client: Arc<C>) -> Self {
        Self {
            manager: GitHubReleaseManager::new(client),
            phase: ReleasePhase::Start,
        }
    }

    /// Current phase
    pub fn phase(&self) -> ReleasePhase {
        self.phase
    }

    /// Run the whole release.
    ///
    /// Returns `Ok` once every upload has finished, whatever their outcome.
    pub async fn run(&mut self, config: &ReleaseConfig) -> Result<ReleaseOutcome> {
        match self.run_phases(config).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.advance(ReleasePhase::Aborted);
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self, config: &ReleaseConfig) -> Result<ReleaseOutcome> {
        let tag = match non_empty(config.tag.as_deref()) {
            Some(tag) => tag.to_string(),
            None => self.manager.latest_tag(&config.repo).await?,
        };
        self.advance(ReleasePhase::TagResolved);

        let name = non_empty(config.name.as_deref())
            .unwrap_or(&tag)
            .to_string();

        let request = ReleaseRequest {
            repo: config.repo.clone(),
            tag_name: tag.clone(),
            name: name.clone(),
            body: config.body.clone(),
            draft: config.draft,
            prerelease: config.prerelease,
        };
        let release = self.manager.create_release(&request).await?;
        self.advance(ReleasePhase::ReleaseCreated);

        self.advance(ReleasePhase::UploadsDispatched);
        let uploads = self
            .manager
            .upload_artifacts(&config.repo, &release, &config.assets)
            .await;
        self.advance(ReleasePhase::UploadsComplete);

        Ok(ReleaseOutcome {
            tag,
            name,
            release,
            uploads,
        })
    }

    fn advance(&mut self, next: ReleasePhase) {
        log::debug!("Release phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
