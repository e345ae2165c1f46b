//! Content fingerprinting for change detection.
//!
//! Every source asset gets a 128-bit MD5 digest over its bytes. The digest is
//! a change-detection checksum, not a security boundary: two runs seeing the
//! same bytes must produce the same digest, and a single flipped pixel must
//! produce a different one. MD5 is plenty for that, and its 32-hex-char
//! output keeps snapshot files small.
//!
//! Files are read in fixed 64 KiB blocks and folded into a streaming hasher,
//! so fingerprinting a 200 MB raw PNG costs the same memory as a 2 KB icon.
//! Content-based rather than mtime-based so fingerprints survive
//! `git checkout`, which resets modification times.

use md5::{Digest, Md5};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read block size for streaming fingerprints.
const BLOCK_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Compute the content fingerprint of a file as a lowercase hex string.
///
/// Deterministic: identical bytes always yield identical digests. Fails only
/// if the file cannot be opened or a read fails mid-stream.
pub fn fingerprint(path: &Path) -> Result<String, HashError> {
    let mut file = File::open(path).map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Md5::new();
    let mut block = vec![0u8; BLOCK_SIZE];
    loop {
        let n = file.read(&mut block).map_err(|source| HashError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn fingerprint_deterministic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");
        fs::write(&path, b"png bytes").unwrap();

        let h1 = fingerprint(&path).unwrap();
        let h2 = fingerprint(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 32); // MD5 hex is 32 chars
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");

        fs::write(&path, b"version 1").unwrap();
        let h1 = fingerprint(&path).unwrap();

        fs::write(&path, b"version 2").unwrap();
        let h2 = fingerprint(&path).unwrap();

        assert_ne!(h1, h2);
    }

    #[test]
    fn fingerprint_streams_across_blocks() {
        // A file larger than one read block must hash the same as the
        // one-shot digest of its full contents.
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.png");
        let data: Vec<u8> = (0..BLOCK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let streamed = fingerprint(&path).unwrap();
        let oneshot = format!("{:x}", Md5::digest(&data));
        assert_eq!(streamed, oneshot);
    }

    #[test]
    fn fingerprint_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.png");
        fs::write(&path, b"").unwrap();

        // d41d8... is the well-known MD5 of zero bytes
        assert_eq!(
            fingerprint(&path).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn fingerprint_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let result = fingerprint(&tmp.path().join("nope.png"));
        assert!(matches!(result, Err(HashError::Read { .. })));
    }
}
