//! Latest-tag resolution by semantic version precedence.

use super::client::{ReleaseApi, RepoRef};
use crate::error::Result;
use crate::version;
use semver::Version;
use std::cmp::Ordering;

/// Walk every page of tags in `repo` and return the highest semantic version.
///
/// Unparseable tags are skipped. With no parseable tags the floor `0.0.1` is
/// returned, which is indistinguishable from a repository whose highest tag
/// really is `0.0.1`. The result is the canonical version string, so `v1.2.0`
/// resolves to `1.2.0`.
pub async fn resolve_latest_tag<C: ReleaseApi>(client: &C, repo: &RepoRef) -> Result<String> {
    let mut latest = version::floor();
    let mut page = 1;

    loop {
        let tag_page = client.list_tags(repo, page).await?;
        log::debug!(
            "Fetched {} tag(s) from page {} of {}",
            tag_page.tags.len(),
            page,
            repo
        );

        latest = highest_version(latest, tag_page.tags.iter().map(|tag| tag.name.as_str()));

        match tag_page.next_page {
            Some(next) if next > page => page = next,
            Some(next) => {
                log::warn!("Ignoring non-advancing next page {} after page {}", next, page);
                break;
            }
            None => break,
        }
    }

    log::info!("Resolved latest tag for {}: {}", repo, latest);
    Ok(latest.to_string())
}

/// Fold tag names into the highest version, starting from `start`.
///
/// Only a strictly greater version replaces the current one, so among equal
/// precedence the first seen wins.
pub fn highest_version<'a>(start: Version, names: impl IntoIterator<Item = &'a str>) -> Version {
    names
        .into_iter()
        .filter_map(|name| match version::parse_tag(name) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::debug!("Skipping tag: {}", e);
                None
            }
        })
        .fold(start, |best, candidate| {
            if version::compare(&candidate, &best) == Ordering::Greater {
                candidate
            } else {
                best
            }
        })
}
