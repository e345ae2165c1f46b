//! Source asset discovery and parallel fingerprinting.
//!
//! The raw-input root is the sole discovery mechanism: a **non-recursive**
//! scan for files whose extension matches the configured set. Subdirectories
//! are ignored on purpose — nested raw trees were never part of the layout,
//! and silently recursing would surprise anyone keeping rejects in
//! `raw/old/`.
//!
//! Discovered assets are fingerprinted in parallel with rayon. Hashing is
//! read-only over disjoint files, so the fan-out needs no coordination
//! beyond collecting per-file results; an unreadable file becomes a recorded
//! failure for that asset, never an abort.

use crate::hash::{self, HashError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot scan raw directory {path}: {source}")]
    RawRoot {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// One source file that could not be fingerprinted.
#[derive(Debug)]
pub struct HashFailure {
    pub name: String,
    pub error: HashError,
}

/// Result of fingerprinting the raw root: successful `filename → digest`
/// entries plus per-file failures.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub digests: BTreeMap<String, String>,
    pub failures: Vec<HashFailure>,
}

/// List recognized source filenames in the raw root, sorted.
///
/// Matching is case-insensitive on the extension (`Icon.PNG` counts), and
/// the snapshot/config files the pipeline itself keeps in the raw root are
/// never assets, dotfiles generally aren't either.
pub fn discover(raw_root: &Path, extensions: &[String]) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(raw_root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ScanError::RawRoot {
            path: raw_root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let recognized = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                extensions.iter().any(|e| *e == ext)
            });
        if recognized {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Fingerprint every discovered asset, in parallel.
///
/// Runs on the global rayon pool (sized by the caller). Workers produce
/// per-file results that are merged afterwards, so there is no shared
/// mutable state during the fan-out.
pub fn fingerprint_all(raw_root: &Path, names: &[String]) -> ScanResult {
    let outcomes: Vec<(String, Result<String, HashError>)> = names
        .par_iter()
        .map(|name| (name.clone(), hash::fingerprint(&raw_root.join(name))))
        .collect();

    let mut result = ScanResult::default();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(digest) => {
                result.digests.insert(name, digest);
            }
            Err(error) => result.failures.push(HashFailure { name, error }),
        }
    }
    result
}
