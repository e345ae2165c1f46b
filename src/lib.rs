//! # WARP — incremental mobile asset pipeline
//!
//! Takes a directory of raw raster images and produces platform-specific
//! resized, compressed variants: Android density buckets or iOS scale
//! suffixes. Only the images that changed since the last run are
//! re-processed.
//!
//! # Architecture: classify, then act
//!
//! Every run flows one direction through five small pieces:
//!
//! ```text
//! raw/*.png ──hash──▶ current digests ──┐
//!                                       ├─▶ classify ─▶ {unchanged, new,
//! .warp-snapshot.json ──load────────────┘               modified, deleted}
//!                                                            │
//!                         save new snapshot (write-ahead)    │
//!                                                            ▼
//!                              per-asset actions: skip / generate /
//!                              delete+regenerate / delete, fanned out
//!                              across density variants
//! ```
//!
//! The interesting part is the middle: a content-addressed snapshot diff
//! that classifies each source file, and a write-ahead snapshot save that
//! keeps interrupted runs self-healing — the snapshot always matches the
//! *source* state, so a rerun re-does at most the assets whose outputs
//! were left half-done.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`hash`] | Streaming 128-bit content fingerprints |
//! | [`snapshot`] | Persisted `filename → digest` mapping, atomic save |
//! | [`classify`] | Pure diff of current vs. prior fingerprints |
//! | [`layout`] | Platform variant tables and output path rules |
//! | [`scan`] | Raw-root discovery + parallel fingerprinting |
//! | [`service`] | External transform/compress collaborators (ffmpeg, pngquant) |
//! | [`pipeline`] | Orchestration: classification → per-asset actions |
//! | [`config`] | Optional `warp.toml` (extensions, thread cap) |
//! | [`output`] | CLI line formatting for events and summaries |
//!
//! # Design Decisions
//!
//! ## Content hashes, not mtimes
//!
//! Fingerprints are MD5 over file bytes, streamed in 64 KiB blocks. Mtimes
//! lie (`git checkout`, `cp -p`, CI caches); bytes don't. The digest is a
//! change-detection checksum, not a security boundary.
//!
//! ## The pipeline never touches pixels
//!
//! Scaling and compression live behind the two-method
//! [`service::ImageService`] trait. Production shells out to ffmpeg and
//! pngquant; tests substitute a recording mock. The orchestration logic —
//! the part that actually has bugs worth catching — runs in-process either
//! way.
//!
//! ## Delete-before-regenerate
//!
//! A modified asset's old variants are deleted before the new ones are
//! written. A failed regenerate therefore leaves no output for that asset
//! until the next successful run; the snapshot discipline makes that rerun
//! automatic. Staging new outputs before deleting old ones would change
//! observable behavior and is deliberately not done.

pub mod classify;
pub mod config;
pub mod hash;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod service;
pub mod snapshot;
