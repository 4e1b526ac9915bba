//! GitHub integration for release operations

mod assets;
mod client;
mod release_manager;
mod tags;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::{AssetTask, AssetUpload, UploadReport, UploadedAsset, content_type_for, upload_all};
pub use client::{
    DEFAULT_API_URL, DEFAULT_UPLOAD_URL, GitHubClient, ReleaseApi, RepoRef, TAGS_PER_PAGE, Tag,
    TagPage, parse_next_page,
};
pub use release_manager::{GitHubReleaseManager, ReleaseHandle, ReleaseRequest};
pub use tags::{highest_version, resolve_latest_tag};
