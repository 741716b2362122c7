//! Resolve a version selector against the manifest and fetch the release's metadata.

use crate::catalog::{self, Manifest, ReleaseEntry, ReleaseMetadata};
use crate::error::{LaunchError, Result};
use crate::http::HttpSource;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which release the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// `release`: the manifest's latest stable release.
    LatestRelease,
    /// `snapshot`: the manifest's latest snapshot.
    LatestSnapshot,
    /// Any other token, matched verbatim against release ids.
    Exact(String),
}

impl FromStr for VersionSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "release" => VersionSelector::LatestRelease,
            "snapshot" => VersionSelector::LatestSnapshot,
            other => VersionSelector::Exact(other.to_string()),
        })
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::LatestRelease => write!(f, "release"),
            VersionSelector::LatestSnapshot => write!(f, "snapshot"),
            VersionSelector::Exact(id) => write!(f, "{}", id),
        }
    }
}

impl VersionSelector {
    /// Release id this selector stands for in `manifest` (aliases substituted).
    pub fn target<'m>(&'m self, manifest: &'m Manifest) -> &'m str {
        match self {
            VersionSelector::LatestRelease => &manifest.latest.release,
            VersionSelector::LatestSnapshot => &manifest.latest.snapshot,
            VersionSelector::Exact(id) => id,
        }
    }
}

/// A release id together with its artifact location and digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub id: String,
    pub metadata: ReleaseMetadata,
}

/// Find the manifest entry for `selector`. First match wins.
pub fn find_release<'m>(selector: &VersionSelector, manifest: &'m Manifest) -> Result<&'m ReleaseEntry> {
    let target = selector.target(manifest);
    manifest
        .versions
        .iter()
        .find(|v| v.id == target)
        .ok_or_else(|| LaunchError::InvalidVersion {
            selector: selector.to_string(),
            target: target.to_string(),
        })
}

/// Resolve `selector` and fetch that release's metadata document.
/// Catalog errors from the metadata fetch are returned unchanged.
pub fn resolve(
    source: &dyn HttpSource,
    selector: &VersionSelector,
    manifest: &Manifest,
) -> Result<ResolvedRelease> {
    let entry = find_release(selector, manifest)?;
    tracing::info!(selector = %selector, release = %entry.id, "resolved version");
    let metadata = catalog::fetch_release_metadata(source, &entry.url)?;
    Ok(ResolvedRelease {
        id: entry.id.clone(),
        metadata,
    })
}
