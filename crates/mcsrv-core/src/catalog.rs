//! Catalog client: the version manifest and per-release documents.
//!
//! Unknown JSON fields (release type, timestamps, client downloads, ...) are ignored.

use crate::error::{LaunchError, Result};
use crate::http::HttpSource;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Decoded version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub latest: Latest,
    pub versions: Vec<ReleaseEntry>,
}

/// Ids the `release` / `snapshot` aliases point at.
#[derive(Debug, Clone, Deserialize)]
pub struct Latest {
    pub release: String,
    pub snapshot: String,
}

/// One listed release and the location of its metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseEntry {
    pub id: String,
    pub url: String,
}

/// Artifact location and expected digest for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub artifact_url: String,
    /// Lowercase hex SHA-1.
    pub expected_hash: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseDocument {
    downloads: Downloads,
}

#[derive(Debug, Deserialize)]
struct Downloads {
    // Some early releases ship no server artifact.
    server: Option<DownloadEntry>,
}

#[derive(Debug, Deserialize)]
struct DownloadEntry {
    sha1: String,
    url: String,
}

/// GET `url` and decode the body as JSON into `T`. No retries.
pub fn fetch_json<T: DeserializeOwned>(source: &dyn HttpSource, url: &str) -> Result<T> {
    let body = source.get(url).map_err(|e| LaunchError::Network {
        url: url.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&body).map_err(|e| LaunchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub fn fetch_manifest(source: &dyn HttpSource, url: &str) -> Result<Manifest> {
    let manifest: Manifest = fetch_json(source, url)?;
    tracing::debug!(
        url,
        releases = manifest.versions.len(),
        latest_release = %manifest.latest.release,
        latest_snapshot = %manifest.latest.snapshot,
        "fetched version manifest"
    );
    Ok(manifest)
}

/// Fetch a release document and extract the server artifact.
pub fn fetch_release_metadata(source: &dyn HttpSource, url: &str) -> Result<ReleaseMetadata> {
    let doc: ReleaseDocument = fetch_json(source, url)?;
    let server = doc.downloads.server.ok_or_else(|| LaunchError::Decode {
        url: url.to_string(),
        reason: "release has no downloads.server entry".to_string(),
    })?;
    Ok(ReleaseMetadata {
        artifact_url: server.url,
        expected_hash: server.sha1.trim().to_ascii_lowercase(),
    })
}
