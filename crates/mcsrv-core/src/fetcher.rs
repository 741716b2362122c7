//! Integrity-verified fetcher.
//!
//! Makes sure the artifact at a local path has the catalog's SHA-1, downloading
//! it at most once per call. A file is only ever trusted after its bytes have
//! been hashed; a download interrupted halfway leaves a file that the next
//! verification rejects.

use crate::checksum;
use crate::error::{LaunchError, Result};
use crate::http::{HttpSource, TransferError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// State of the local artifact relative to an expected digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Absent,
    PresentUnverified,
    PresentVerified,
}

/// How `ensure` arrived at a verified file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Existing file already matched; nothing downloaded.
    AlreadyVerified,
    /// No file existed; downloaded once.
    Downloaded,
    /// Existing file mismatched; downloaded once more.
    Redownloaded,
}

/// A local file whose content digest matched the catalog. Only [`ensure`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtifact {
    path: PathBuf,
    sha1: String,
    outcome: FetchOutcome,
}

impl VerifiedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    pub fn outcome(&self) -> FetchOutcome {
        self.outcome
    }
}

/// Hash `path`, or `None` if it does not exist.
fn current_digest(path: &Path) -> Result<Option<String>> {
    match checksum::sha1_path(path) {
        Ok(digest) => Ok(Some(digest)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LaunchError::file_io("hash", path, e)),
    }
}

/// Classify the file at `path` without touching the network.
pub fn artifact_state(path: &Path, expected_hash: &str) -> Result<ArtifactState> {
    Ok(match current_digest(path)? {
        None => ArtifactState::Absent,
        Some(actual) if checksum::digest_matches(expected_hash, &actual) => {
            ArtifactState::PresentVerified
        }
        Some(_) => ArtifactState::PresentUnverified,
    })
}

/// Truncate/create `path` and stream `url` into it, synced to disk before returning.
fn download_to(source: &dyn HttpSource, url: &str, path: &Path) -> Result<u64> {
    let file = File::create(path).map_err(|e| LaunchError::file_io("create", path, e))?;
    let mut writer = BufWriter::new(file);
    let written = source.download(url, &mut writer).map_err(|e| match e {
        TransferError::Sink(err) => LaunchError::file_io("write", path, err),
        other => LaunchError::Download {
            url: url.to_string(),
            source: other,
        },
    })?;
    writer
        .flush()
        .map_err(|e| LaunchError::file_io("write", path, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| LaunchError::file_io("write", path, e.into_error()))?;
    file.sync_all()
        .map_err(|e| LaunchError::file_io("sync", path, e))?;
    tracing::info!(url, path = %path.display(), bytes = written, "downloaded artifact");
    Ok(written)
}

/// Download and hash; the result must match or the run fails.
fn download_and_verify(
    source: &dyn HttpSource,
    path: &Path,
    artifact_url: &str,
    expected_hash: &str,
    outcome: FetchOutcome,
) -> Result<VerifiedArtifact> {
    download_to(source, artifact_url, path)?;
    let actual = checksum::sha1_path(path).map_err(|e| LaunchError::file_io("hash", path, e))?;
    if !checksum::digest_matches(expected_hash, &actual) {
        // Left in place; the next run re-verifies it.
        return Err(LaunchError::Verify {
            path: path.to_path_buf(),
            expected: expected_hash.trim().to_ascii_lowercase(),
            actual,
        });
    }
    Ok(VerifiedArtifact {
        path: path.to_path_buf(),
        sha1: actual,
        outcome,
    })
}

/// Ensure `path` holds the artifact from `artifact_url` with SHA-1 `expected_hash`.
///
/// - absent: download, verify.
/// - present: verify in place; on mismatch download once more and verify.
///
/// A mismatch after the download is `LaunchError::Verify`; there is no second retry.
pub fn ensure(
    source: &dyn HttpSource,
    path: &Path,
    artifact_url: &str,
    expected_hash: &str,
) -> Result<VerifiedArtifact> {
    match current_digest(path)? {
        None => {
            tracing::info!(path = %path.display(), "artifact absent; downloading");
            download_and_verify(source, path, artifact_url, expected_hash, FetchOutcome::Downloaded)
        }
        Some(actual) if checksum::digest_matches(expected_hash, &actual) => {
            tracing::debug!(path = %path.display(), sha1 = %actual, "artifact already verified");
            Ok(VerifiedArtifact {
                path: path.to_path_buf(),
                sha1: actual,
                outcome: FetchOutcome::AlreadyVerified,
            })
        }
        Some(actual) => {
            tracing::warn!(
                path = %path.display(),
                expected = %expected_hash,
                actual = %actual,
                "artifact checksum mismatch; downloading again"
            );
            download_and_verify(source, path, artifact_url, expected_hash, FetchOutcome::Redownloaded)
        }
    }
}
