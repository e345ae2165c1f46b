//! Incremental pipeline orchestration.
//!
//! [`run`] ties the stages together: discover and fingerprint the raw root,
//! diff against the persisted snapshot, then drive exactly one action per
//! classified asset:
//!
//! | Classification | Action |
//! |----------------|--------|
//! | unchanged | nothing (reported up-to-date) |
//! | new       | transform + compress every variant |
//! | modified  | delete existing variant outputs, then regenerate all |
//! | deleted   | delete existing variant outputs |
//!
//! # Write-ahead snapshot
//!
//! The new snapshot is saved *before* the first output file is touched. A
//! crash mid-run therefore leaves the snapshot consistent with the source
//! state; the interrupted assets classify as modified on the next run and
//! regeneration, being idempotent, self-heals. Snapshot save failure is the
//! one fatal error here — without it the next run's classification would be
//! unreliable.
//!
//! After processing, a run with failures amends the snapshot once more:
//! failed assets are dropped (or, for a failed removal, restored to their
//! prior entry), so the very next run retries them even if the source
//! hasn't changed.
//!
//! # Failure isolation
//!
//! Everything else is per-asset: an unreadable source, a failed transform,
//! or a failed compress is recorded in the [`RunReport`] and the remaining
//! assets and variants continue. A missing prior output during
//! delete-before-regenerate is only a warning — the regenerate still runs.
//!
//! # Parallelism
//!
//! Assets are independent, so each classification set fans out across rayon
//! workers; within one asset the variants run in order with transform
//! completing before compress. Progress events go over an mpsc channel to a
//! printer thread rather than stdout directly, so workers never interleave
//! output.

use crate::classify;
use crate::layout::Platform;
use crate::scan::{self, ScanError};
use crate::service::{ImageService, ServiceError};
use crate::snapshot::{Snapshot, SnapshotError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("cannot create output directory {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Progress events emitted while the pipeline runs.
///
/// Formatting lives in [`crate::output`]; the pipeline only reports what
/// happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UpToDate { name: String },
    Generated { name: String, variants: usize },
    Regenerated { name: String, variants: usize },
    Removed { name: String },
    MissingOutput { name: String, path: PathBuf },
    Failed { name: String, detail: String },
}

/// One asset whose action could not be completed.
#[derive(Debug, Clone)]
pub struct AssetFailure {
    pub name: String,
    pub detail: String,
}

/// Aggregated outcome of a run. Counters count assets, not variants.
#[derive(Debug, Default)]
pub struct RunReport {
    pub up_to_date: usize,
    pub generated: usize,
    pub regenerated: usize,
    pub removed: usize,
    /// Missing-prior-output warnings (non-fatal).
    pub warnings: usize,
    pub failures: Vec<AssetFailure>,
}

impl RunReport {
    /// True when every per-asset action completed.
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub raw_root: PathBuf,
    pub out_root: PathBuf,
    pub platform: Platform,
    /// Recognized source extensions (lowercase, no dot).
    pub extensions: Vec<String>,
}

/// Execute one full incremental run.
pub fn run(
    service: &impl ImageService,
    options: &RunOptions,
    events: Option<&Sender<Event>>,
) -> Result<RunReport, PipelineError> {
    let raw_root = options.raw_root.as_path();
    let out_root = options.out_root.as_path();
    let platform = options.platform;

    // Phase 1: read and record current state.
    let names = scan::discover(raw_root, &options.extensions)?;
    let scanned = scan::fingerprint_all(raw_root, &names);

    let previous = Snapshot::load(raw_root);
    let classifiable = classifiable_entries(&previous.entries, &scanned.failures);
    let classification = classify::classify(&scanned.digests, &classifiable);

    // Ordering barrier: persist the new snapshot before mutating outputs.
    Snapshot::from_entries(scanned.digests.clone()).save(raw_root)?;

    for dir in platform.output_dirs(out_root) {
        std::fs::create_dir_all(&dir).map_err(|source| PipelineError::OutputRoot {
            path: dir.clone(),
            source,
        })?;
    }

    // Phase 2: mutate the output tree.
    let mut report = RunReport::default();

    for failure in &scanned.failures {
        let detail = failure.error.to_string();
        emit(
            events,
            Event::Failed {
                name: failure.name.clone(),
                detail: detail.clone(),
            },
        );
        report.failures.push(AssetFailure {
            name: failure.name.clone(),
            detail,
        });
    }

    for name in &classification.unchanged {
        emit(events, Event::UpToDate { name: name.clone() });
        report.up_to_date += 1;
    }

    let removals: Vec<AssetOutcome> = classification
        .deleted
        .par_iter()
        .map(|name| remove_asset(options, name, events))
        .collect();

    let regenerations: Vec<AssetOutcome> = classification
        .modified
        .par_iter()
        .map(|name| regenerate_asset(service, options, name, events))
        .collect();

    let generations: Vec<AssetOutcome> = classification
        .new
        .par_iter()
        .map(|name| generate_asset(service, options, name, events))
        .collect();

    for outcome in removals
        .into_iter()
        .chain(regenerations)
        .chain(generations)
    {
        report.warnings += outcome.warnings;
        match outcome.result {
            Ok(action) => match action {
                Action::Generated => report.generated += 1,
                Action::Regenerated => report.regenerated += 1,
                Action::Removed => report.removed += 1,
            },
            Err(detail) => report.failures.push(AssetFailure {
                name: outcome.name,
                detail,
            }),
        }
    }

    // Failure amendment: drop failed assets from the snapshot (or restore
    // the prior entry for a failed removal) so the next run reclassifies
    // and retries them without needing a source edit.
    if !report.failures.is_empty() {
        let mut entries = scanned.digests.clone();
        for failure in &report.failures {
            match previous.entries.get(&failure.name) {
                Some(prior) if !entries.contains_key(&failure.name) => {
                    entries.insert(failure.name.clone(), prior.clone());
                }
                _ => {
                    entries.remove(&failure.name);
                }
            }
        }
        Snapshot::from_entries(entries).save(raw_root)?;
    }

    Ok(report)
}

/// Previous-snapshot view used for classification. An asset whose
/// fingerprint could not be read this run is absent from both sides of
/// the diff, so it lands in none of the four sets and its existing
/// outputs stay untouched. It is still reported as failed, and the
/// failure amendment keeps its prior entry so the next run retries it.
fn classifiable_entries(
    previous: &BTreeMap<String, String>,
    failures: &[scan::HashFailure],
) -> BTreeMap<String, String> {
    let mut view = previous.clone();
    for failure in failures {
        view.remove(&failure.name);
    }
    view
}

/// Discard the snapshot and the output tree, forcing the next run to
/// classify every asset as new.
pub fn clean(raw_root: &Path, out_root: &Path) -> std::io::Result<()> {
    Snapshot::discard(raw_root)?;
    match std::fs::remove_dir_all(out_root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

enum Action {
    Generated,
    Regenerated,
    Removed,
}

struct AssetOutcome {
    name: String,
    warnings: usize,
    result: Result<Action, String>,
}

fn emit(events: Option<&Sender<Event>>, event: Event) {
    if let Some(tx) = events {
        // A dropped receiver means nobody is listening; keep working.
        let _ = tx.send(event);
    }
}

/// Delete every variant output for `name`. Missing files are warnings,
/// other I/O errors become the asset's failure; remaining variants are
/// still attempted either way.
fn delete_outputs(
    options: &RunOptions,
    name: &str,
    events: Option<&Sender<Event>>,
) -> (usize, Option<String>) {
    let mut warnings = 0;
    let mut first_error = None;

    for path in options.platform.output_paths(&options.out_root, name) {
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warnings += 1;
                emit(
                    events,
                    Event::MissingOutput {
                        name: name.to_string(),
                        path,
                    },
                );
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(format!("cannot delete {}: {e}", path.display()));
                }
            }
        }
    }

    (warnings, first_error)
}

/// Transform + compress every variant for `name`. Transform must succeed
/// before compress runs for the same variant.
fn generate_outputs(
    service: &impl ImageService,
    options: &RunOptions,
    name: &str,
) -> Result<usize, ServiceError> {
    let source = options.raw_root.join(name);
    let variants = options.platform.variants();

    for variant in variants {
        let dest = options
            .platform
            .output_path(&options.out_root, name, variant);
        service.transform(&source, variant.scale, &dest)?;
        service.compress(&dest)?;
    }

    Ok(variants.len())
}

fn generate_asset(
    service: &impl ImageService,
    options: &RunOptions,
    name: &str,
    events: Option<&Sender<Event>>,
) -> AssetOutcome {
    match generate_outputs(service, options, name) {
        Ok(variants) => {
            emit(
                events,
                Event::Generated {
                    name: name.to_string(),
                    variants,
                },
            );
            AssetOutcome {
                name: name.to_string(),
                warnings: 0,
                result: Ok(Action::Generated),
            }
        }
        Err(e) => failed(name, e.to_string(), 0, events),
    }
}

fn regenerate_asset(
    service: &impl ImageService,
    options: &RunOptions,
    name: &str,
    events: Option<&Sender<Event>>,
) -> AssetOutcome {
    let (warnings, delete_error) = delete_outputs(options, name, events);
    if let Some(detail) = delete_error {
        return failed(name, detail, warnings, events);
    }

    match generate_outputs(service, options, name) {
        Ok(variants) => {
            emit(
                events,
                Event::Regenerated {
                    name: name.to_string(),
                    variants,
                },
            );
            AssetOutcome {
                name: name.to_string(),
                warnings,
                result: Ok(Action::Regenerated),
            }
        }
        Err(e) => failed(name, e.to_string(), warnings, events),
    }
}

fn remove_asset(
    options: &RunOptions,
    name: &str,
    events: Option<&Sender<Event>>,
) -> AssetOutcome {
    let (warnings, delete_error) = delete_outputs(options, name, events);
    match delete_error {
        None => {
            emit(events, Event::Removed { name: name.to_string() });
            AssetOutcome {
                name: name.to_string(),
                warnings,
                result: Ok(Action::Removed),
            }
        }
        Some(detail) => failed(name, detail, warnings, events),
    }
}

fn failed(
    name: &str,
    detail: String,
    warnings: usize,
    events: Option<&Sender<Event>>,
) -> AssetOutcome {
    emit(
        events,
        Event::Failed {
            name: name.to_string(),
            detail: detail.clone(),
        },
    );
    AssetOutcome {
        name: name.to_string(),
        warnings,
        result: Err(detail),
    }
}
