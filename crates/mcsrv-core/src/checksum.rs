//! Content digests of local artifacts.
//!
//! The catalog declares SHA-1 digests, so that is what verification uses.

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute a digest of a file and return it as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
/// IO errors are returned bare so callers can attach their own path context.
pub fn digest_path<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match f.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-1 of a file as lowercase hex.
pub fn sha1_path(path: &Path) -> io::Result<String> {
    digest_path::<Sha1>(path)
}

/// True if `actual` equals `expected`, ignoring ASCII case and surrounding whitespace.
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}
