//! In-memory `ReleaseApi` for unit tests.

use super::assets::{AssetUpload, UploadedAsset};
use super::client::{ReleaseApi, RepoRef, Tag, TagPage};
use super::release_manager::{ReleaseHandle, ReleaseRequest};
use crate::error::GitHubError;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::io::AsyncReadExt;

/// Upload as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub release_id: u64,
    pub name: String,
    pub content_type: &'static str,
    pub size: u64,
    pub contents: Vec<u8>,
}

/// Scripted GitHub stand-in that records every call
#[derive(Debug, Default)]
pub struct MockApi {
    tag_pages: Vec<Vec<String>>,
    fail_tags_page: Option<u32>,
    fail_create: bool,
    fail_uploads: HashSet<String>,
    pages_requested: Mutex<Vec<u32>>,
    created: Mutex<Vec<ReleaseRequest>>,
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl MockApi {
    pub fn with_tag_pages(pages: Vec<Vec<&str>>) -> Self {
        Self {
            tag_pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(str::to_string).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn fail_tags_on_page(mut self, page: u32) -> Self {
        self.fail_tags_page = Some(page);
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn fail_upload_of(mut self, name: &str) -> Self {
        self.fail_uploads.insert(name.to_string());
        self
    }

    pub fn tag_pages_requested(&self) -> Vec<u32> {
        self.pages_requested.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<ReleaseRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl ReleaseApi for MockApi {
    async fn list_tags(&self, _repo: &RepoRef, page: u32) -> Result<TagPage, GitHubError> {
        self.pages_requested.lock().unwrap().push(page);

        if self.fail_tags_page == Some(page) {
            return Err(GitHubError::Status {
                operation: "list tags",
                status: 401,
                message: "Bad credentials".to_string(),
            });
        }

        let index = page.saturating_sub(1) as usize;
        let tags = self
            .tag_pages
            .get(index)
            .map(|names| names.iter().map(|name| Tag { name: name.clone() }).collect())
            .unwrap_or_default();
        let next_page = (index + 1 < self.tag_pages.len()).then_some(page + 1);

        Ok(TagPage { tags, next_page })
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<ReleaseHandle, GitHubError> {
        self.created.lock().unwrap().push(request.clone());

        if self.fail_create {
            return Err(GitHubError::Status {
                operation: "create release",
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }

        Ok(ReleaseHandle {
            id: 42,
            html_url: format!(
                "https://github.com/{}/releases/tag/{}",
                request.repo, request.tag_name
            ),
        })
    }

    async fn upload_asset(
        &self,
        _repo: &RepoRef,
        release: &ReleaseHandle,
        mut asset: AssetUpload,
    ) -> Result<UploadedAsset, GitHubError> {
        let mut contents = Vec::new();
        asset
            .file
            .read_to_end(&mut contents)
            .await
            .map_err(|e| GitHubError::ClientInit(e.to_string()))?;

        if self.fail_uploads.contains(&asset.name) {
            return Err(GitHubError::Status {
                operation: "upload asset",
                status: 500,
                message: "upload rejected".to_string(),
            });
        }

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(RecordedUpload {
            release_id: release.id,
            name: asset.name.clone(),
            content_type: asset.content_type,
            size: asset.size,
            contents,
        });

        Ok(UploadedAsset {
            id: uploads.len() as u64,
            name: asset.name,
            size: asset.size,
            browser_download_url: String::new(),
        })
    }
}
