//! Concurrent release asset upload.
//!
//! Every file is uploaded by its own tokio task. A failing file (missing,
//! unreadable, rejected by GitHub) only ends its own task; siblings keep
//! going and the release is still considered a success.

use super::client::{ReleaseApi, RepoRef};
use super::release_manager::ReleaseHandle;
use crate::error::AssetError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One file to attach to the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTask {
    /// Path on the local filesystem
    pub local_path: PathBuf,
    /// Name shown on the release (base name of `local_path`)
    pub display_name: String,
}

impl AssetTask {
    /// Build a task, deriving the display name from the path's base name
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let local_path = path.into();
        let display_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AssetError::InvalidName {
                path: local_path.clone(),
            })?;

        Ok(Self {
            local_path,
            display_name,
        })
    }
}

/// An opened file ready to be sent
#[derive(Debug)]
pub struct AssetUpload {
    /// Asset name on the release
    pub name: String,
    /// MIME type sent as `Content-Type`
    pub content_type: &'static str,
    /// File size in bytes
    pub size: u64,
    /// Open handle; dropped when the upload finishes either way
    pub file: tokio::fs::File,
}

/// Asset as reported back by GitHub
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Asset ID
    pub id: u64,
    /// Asset name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

/// Outcome of uploading a batch of assets
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Assets that made it onto the release
    pub uploaded: Vec<UploadedAsset>,
    /// Assets that were abandoned, with the reason
    pub failed: Vec<AssetError>,
}

impl UploadReport {
    /// Whether every asset was uploaded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of assets attempted
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }
}

/// Upload every path as an asset of `release`, concurrently.
///
/// Returns once all uploads have finished. Individual failures are logged
/// and collected in the report, never propagated.
pub async fn upload_all<C: ReleaseApi + 'static>(
    client: Arc<C>,
    repo: &RepoRef,
    release: &ReleaseHandle,
    paths: &[PathBuf],
) -> UploadReport {
    let handles: Vec<_> = paths
        .iter()
        .map(|path| {
            let client = Arc::clone(&client);
            let repo = repo.clone();
            let release = release.clone();
            let path = path.clone();
            let task = tokio::spawn({
                let path = path.clone();
                async move {
                    let result = upload_one(client.as_ref(), &repo, &release, path).await;
                    if let Err(e) = &result {
                        log::error!("{}", e);
                    }
                    result
                }
            });
            (path, task)
        })
        .collect();

    let mut report = UploadReport::default();
    for (path, task) in handles {
        match task.await {
            Ok(Ok(asset)) => report.uploaded.push(asset),
            Ok(Err(e)) => report.failed.push(e),
            Err(e) => {
                let failure = AssetError::TaskFailed {
                    path,
                    reason: e.to_string(),
                };
                log::error!("{}", failure);
                report.failed.push(failure);
            }
        }
    }

    report
}

/// Upload a single file. The file handle lives only inside this call.
async fn upload_one<C: ReleaseApi>(
    client: &C,
    repo: &RepoRef,
    release: &ReleaseHandle,
    path: PathBuf,
) -> Result<UploadedAsset, AssetError> {
    let task = AssetTask::from_path(path)?;

    let file = tokio::fs::File::open(&task.local_path)
        .await
        .map_err(|source| AssetError::Open {
            path: task.local_path.clone(),
            source,
        })?;
    let size = file
        .metadata()
        .await
        .map_err(|source| AssetError::Open {
            path: task.local_path.clone(),
            source,
        })?
        .len();

    log::info!("Uploading asset {}", task.local_path.display());

    let upload = AssetUpload {
        name: task.display_name.clone(),
        content_type: content_type_for(&task.local_path),
        size,
        file,
    };

    let asset = client
        .upload_asset(repo, release, upload)
        .await
        .map_err(|source| AssetError::Upload {
            path: task.local_path.clone(),
            source,
        })?;

    log::info!("Uploaded asset {} ({} bytes)", task.local_path.display(), size);
    Ok(asset)
}

/// MIME type for an asset, from its extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("deb") => "application/vnd.debian.binary-package",
        Some("rpm") => "application/x-rpm",
        Some("exe") | Some("msi") => "application/x-msdownload",
        Some("dmg") => "application/x-apple-diskimage",
        Some("AppImage") => "application/x-executable",
        Some("zip") => "application/zip",
        Some("gz") | Some("tgz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("xz") => "application/x-xz",
        Some("json") => "application/json",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}
