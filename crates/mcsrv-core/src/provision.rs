//! Resolve → fetch pipeline: from a selector to a verified local artifact.
//!
//! Strictly sequential and blocking; call from `spawn_blocking` in async code.

use crate::catalog;
use crate::error::Result;
use crate::fetcher::{self, VerifiedArtifact};
use crate::http::HttpSource;
use crate::resolver::{self, VersionSelector};
use std::path::Path;

/// Fetch the manifest at `manifest_url`, resolve `selector`, and make sure
/// `path` holds that release's artifact with a matching digest.
pub fn provision(
    source: &dyn HttpSource,
    manifest_url: &str,
    selector: &VersionSelector,
    path: &Path,
) -> Result<VerifiedArtifact> {
    let manifest = catalog::fetch_manifest(source, manifest_url)?;
    let release = resolver::resolve(source, selector, &manifest)?;
    let artifact = fetcher::ensure(
        source,
        path,
        &release.metadata.artifact_url,
        &release.metadata.expected_hash,
    )?;
    tracing::info!(
        release = %release.id,
        path = %artifact.path().display(),
        outcome = ?artifact.outcome(),
        "artifact ready"
    );
    Ok(artifact)
}
