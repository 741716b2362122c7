//! Error kinds for the resolve → fetch → launch pipeline.
//!
//! Every variant aborts the run. The only recovery is the fetcher's single
//! re-download on checksum mismatch, which happens before an error is built.

use crate::http::TransferError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// Catalog document could not be fetched (transport failure or non-2xx).
    #[error("fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransferError,
    },

    /// Catalog document was fetched but is not the expected shape.
    #[error("decoding {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Selector (after alias substitution) names no listed release.
    #[error("invalid version {selector:?}: no release {target:?} in the catalog")]
    InvalidVersion { selector: String, target: String },

    /// Artifact download failed at the transport level.
    #[error("downloading {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: TransferError,
    },

    /// Local artifact could not be created, opened, read, written or synced.
    #[error("{op} {}: {source}", .path.display())]
    FileIo {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Digest still mismatched after the one permitted re-download.
    #[error("sha1 checksum of {} doesn't validate: expected {expected}, got {actual}", .path.display())]
    Verify {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Child process could not be started.
    #[error("starting {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child or wiring its pipes failed.
    #[error("supervising child: {0}")]
    IoBridge(String),
}

impl LaunchError {
    pub(crate) fn file_io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LaunchError::FileIo {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_names_selector_and_target() {
        let err = LaunchError::InvalidVersion {
            selector: "release".to_string(),
            target: "1.20.1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"release\""));
        assert!(msg.contains("\"1.20.1\""));
    }

    #[test]
    fn verify_error_shows_both_digests() {
        let err = LaunchError::Verify {
            path: PathBuf::from("server.jar"),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sha1 checksum of server.jar doesn't validate: expected aa, got bb"
        );
    }

    #[test]
    fn network_error_keeps_transfer_source() {
        let err = LaunchError::Network {
            url: "http://catalog/".to_string(),
            source: TransferError::Http(503),
        };
        assert_eq!(err.to_string(), "fetching http://catalog/: HTTP 503");
        assert!(std::error::Error::source(&err).is_some());
    }
}
