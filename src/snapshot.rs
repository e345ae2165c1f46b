//! Persisted fingerprint snapshot for incremental runs.
//!
//! The snapshot is the memory between runs: a `filename → digest` mapping
//! recorded at the end of the previous run, stored as JSON next to the raw
//! assets it describes (`<raw>/.warp-snapshot.json`). Diffing the current
//! fingerprints against it is what lets the pipeline skip assets that
//! haven't changed.
//!
//! # Write-ahead discipline
//!
//! The pipeline saves the *new* snapshot before it deletes or regenerates a
//! single output file. If the process dies mid-run, the snapshot on disk
//! matches the *source* state, and the next run re-classifies any
//! half-regenerated asset as modified — regeneration is idempotent, so a
//! rerun self-heals. The save itself goes through a temporary sibling file
//! plus rename, so a reader never observes a partially-written snapshot.
//!
//! # Missing and corrupt files
//!
//! A missing snapshot is the normal first-run case and loads as an empty
//! mapping. A corrupt or version-mismatched snapshot also loads as empty:
//! the worst outcome is a full rebuild, which beats refusing to run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the snapshot file within the raw-input root.
pub const SNAPSHOT_FILENAME: &str = ".warp-snapshot.json";

/// Version of the snapshot format. Bump to invalidate all existing
/// snapshots when the encoding or digest computation changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("cannot write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk mapping of source filename to content digest.
///
/// `BTreeMap` keeps the serialized form stable across runs, so an unchanged
/// source tree produces a byte-identical snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
}

impl Snapshot {
    /// Create an empty snapshot (first run, or after `--clean`).
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Build a snapshot from the current fingerprint mapping.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries,
        }
    }

    /// Load from the raw-input root. Returns an empty snapshot if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(raw_root: &Path) -> Self {
        let path = raw_root.join(SNAPSHOT_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let snapshot: Self = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(_) => return Self::empty(),
        };
        if snapshot.version != SNAPSHOT_VERSION {
            return Self::empty();
        }
        snapshot
    }

    /// Save to the raw-input root.
    ///
    /// Writes to a `.tmp` sibling first and renames into place, so a crash
    /// mid-write leaves the previous snapshot intact rather than a truncated
    /// file.
    pub fn save(&self, raw_root: &Path) -> Result<(), SnapshotError> {
        let path = raw_root.join(SNAPSHOT_FILENAME);
        let tmp_path = raw_root.join(format!("{SNAPSHOT_FILENAME}.tmp"));
        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(&tmp_path, json).map_err(|source| SnapshotError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Delete the snapshot file, if present. Used by `--clean`.
    pub fn discard(raw_root: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(raw_root.join(SNAPSHOT_FILENAME)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot_with(pairs: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_entries(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    // =========================================================================
    // Save / Load roundtrip
    // =========================================================================

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let snapshot = snapshot_with(&[("icon.png", "d1"), ("logo.png", "d2")]);

        snapshot.save(tmp.path()).unwrap();
        let loaded = Snapshot::load(tmp.path());

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn empty_snapshot_roundtrip() {
        let tmp = TempDir::new().unwrap();
        Snapshot::empty().save(tmp.path()).unwrap();
        let loaded = Snapshot::load(tmp.path());
        assert_eq!(loaded, Snapshot::empty());
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let loaded = Snapshot::load(tmp.path());
        assert!(loaded.entries.is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SNAPSHOT_FILENAME), "not json").unwrap();
        let loaded = Snapshot::load(tmp.path());
        assert!(loaded.entries.is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"icon.png": "d1"}}}}"#,
            SNAPSHOT_VERSION + 1
        );
        fs::write(tmp.path().join(SNAPSHOT_FILENAME), json).unwrap();
        let loaded = Snapshot::load(tmp.path());
        assert!(loaded.entries.is_empty());
    }

    // =========================================================================
    // Write discipline
    // =========================================================================

    #[test]
    fn save_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        snapshot_with(&[("a.png", "d1")]).save(tmp.path()).unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![SNAPSHOT_FILENAME.to_string()]);
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        snapshot_with(&[("a.png", "old")]).save(tmp.path()).unwrap();
        snapshot_with(&[("b.png", "new")]).save(tmp.path()).unwrap();

        let loaded = Snapshot::load(tmp.path());
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries.get("b.png").map(String::as_str), Some("new"));
    }

    #[test]
    fn save_to_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        let result = snapshot_with(&[("a.png", "d1")]).save(&gone);
        assert!(matches!(result, Err(SnapshotError::Write { .. })));
    }

    #[test]
    fn discard_removes_file_and_tolerates_absence() {
        let tmp = TempDir::new().unwrap();
        snapshot_with(&[("a.png", "d1")]).save(tmp.path()).unwrap();

        Snapshot::discard(tmp.path()).unwrap();
        assert!(!tmp.path().join(SNAPSHOT_FILENAME).exists());

        // Second discard is a no-op, not an error
        Snapshot::discard(tmp.path()).unwrap();
    }
}
