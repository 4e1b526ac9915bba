//! Semantic version parsing and precedence for release tags.
//!
//! Tags are parsed with a single optional leading `v`/`V` stripped, then
//! strictly as semver. Ordering follows semver precedence: build metadata is
//! ignored, and a pre-release sorts before the matching release.

use crate::error::{Result, VersionError};
use semver::Version;
use std::cmp::Ordering;

/// Version used when a repository has no parseable tags.
pub const FLOOR_VERSION: &str = "0.0.1";

/// Parse a tag name as a semantic version.
///
/// `v1.2.3` and `1.2.3` both parse to `1.2.3`. Anything that is not a full
/// `major.minor.patch` version (with optional pre-release and build) fails.
pub fn parse_tag(tag: &str) -> Result<Version> {
    let trimmed = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);

    Version::parse(trimmed).map_err(|source| {
        VersionError::ParseFailed {
            version: tag.to_string(),
            source,
        }
        .into()
    })
}

/// Compare two versions by semver precedence.
///
/// Unlike `Version`'s own `Ord`, build metadata does not take part, so
/// `1.0.0+a` and `1.0.0+b` compare equal.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// The floor version as a parsed value.
pub fn floor() -> Version {
    Version::new(0, 0, 1)
}
