//! External image collaborators: transform and compress.
//!
//! The pipeline never touches pixels. Scaling and compression are two narrow
//! operations behind the [`ImageService`] trait, so the orchestration logic
//! is testable without real image tools — tests substitute the recording
//! [`tests::MockService`].
//!
//! The production implementation is [`ShellService`], which shells out to
//! `ffmpeg` for scaling and `pngquant` for in-place compression. Both must
//! be on `PATH`. A non-zero exit or a failed spawn surfaces as a
//! [`ServiceError`] for that one variant; other variants and assets keep
//! going.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    // Field deliberately not named `source`: thiserror would treat it as
    // the error's source(), and PathBuf is not an Error.
    #[error("transform failed for {input} -> {dest}: {detail}")]
    Transform {
        input: PathBuf,
        dest: PathBuf,
        detail: String,
    },
    #[error("compression failed for {path}: {detail}")]
    Compress { path: PathBuf, detail: String },
}

/// Trait for the two external image operations.
///
/// `Sync` because assets are processed on rayon workers that share one
/// service instance.
pub trait ImageService: Sync {
    /// Resize `source` by `scale` (preserving aspect ratio) into `dest`.
    /// `scale` is a horizontal factor in (0, 1].
    fn transform(&self, source: &Path, scale: f32, dest: &Path) -> Result<(), ServiceError>;

    /// Compress the file at `path` in place.
    fn compress(&self, path: &Path) -> Result<(), ServiceError>;
}

/// Production service shelling out to ffmpeg and pngquant.
#[derive(Debug, Default)]
pub struct ShellService;

impl ShellService {
    pub fn new() -> Self {
        Self
    }
}

impl ImageService for ShellService {
    fn transform(&self, source: &Path, scale: f32, dest: &Path) -> Result<(), ServiceError> {
        // -1 keeps the aspect ratio; -y overwrites stale outputs
        let filter = format!("scale=iw*{scale}:-1");
        let output = Command::new("ffmpeg")
            .args(["-loglevel", "error", "-y", "-i"])
            .arg(source)
            .args(["-vf", &filter])
            .arg(dest)
            .output()
            .map_err(|e| ServiceError::Transform {
                input: source.to_path_buf(),
                dest: dest.to_path_buf(),
                detail: format!("cannot run ffmpeg: {e}"),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ServiceError::Transform {
                input: source.to_path_buf(),
                dest: dest.to_path_buf(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn compress(&self, path: &Path) -> Result<(), ServiceError> {
        let output = Command::new("pngquant")
            .arg(path)
            .args(["--force", "--output"])
            .arg(path)
            .output()
            .map_err(|e| ServiceError::Compress {
                path: path.to_path_buf(),
                detail: format!("cannot run pngquant: {e}"),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ServiceError::Compress {
                path: path.to_path_buf(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Mock service that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon workers.
    #[derive(Default)]
    pub struct MockService {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Source filenames whose transform calls should fail.
        pub fail_transform: BTreeSet<String>,
        /// Destination filenames whose compress calls should fail.
        pub fail_compress: BTreeSet<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Transform {
            source: String,
            scale: f32,
            dest: String,
        },
        Compress {
            path: String,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl MockService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_transform(names: &[&str]) -> Self {
            Self {
                fail_transform: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn failing_compress(names: &[&str]) -> Self {
            Self {
                fail_compress: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageService for MockService {
        fn transform(&self, source: &Path, scale: f32, dest: &Path) -> Result<(), ServiceError> {
            self.operations.lock().unwrap().push(RecordedOp::Transform {
                source: source.to_string_lossy().to_string(),
                scale,
                dest: dest.to_string_lossy().to_string(),
            });
            if self.fail_transform.contains(&file_name(source)) {
                return Err(ServiceError::Transform {
                    input: source.to_path_buf(),
                    dest: dest.to_path_buf(),
                    detail: "mock transform failure".to_string(),
                });
            }
            // Materialize the output so delete-before-regenerate has
            // something to remove on the next run.
            std::fs::write(dest, b"variant").map_err(|e| ServiceError::Transform {
                input: source.to_path_buf(),
                dest: dest.to_path_buf(),
                detail: e.to_string(),
            })?;
            Ok(())
        }

        fn compress(&self, path: &Path) -> Result<(), ServiceError> {
            self.operations.lock().unwrap().push(RecordedOp::Compress {
                path: path.to_string_lossy().to_string(),
            });
            if self.fail_compress.contains(&file_name(path)) {
                return Err(ServiceError::Compress {
                    path: path.to_path_buf(),
                    detail: "mock compress failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn mock_records_transform_then_compress() {
        let tmp = tempfile::TempDir::new().unwrap();
        let service = MockService::new();
        let dest = tmp.path().join("icon.png");

        service
            .transform(Path::new("/raw/icon.png"), 0.5, &dest)
            .unwrap();
        service.compress(&dest).unwrap();

        let ops = service.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Transform { scale, .. } if *scale == 0.5));
        assert!(matches!(&ops[1], RecordedOp::Compress { .. }));
    }

    #[test]
    fn mock_failure_lists_trigger_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let service = MockService::failing_transform(&["bad.png"]);

        let result = service.transform(
            Path::new("/raw/bad.png"),
            1.0,
            &tmp.path().join("bad.png"),
        );
        assert!(matches!(result, Err(ServiceError::Transform { .. })));
    }

    #[test]
    fn transform_error_displays_both_paths() {
        let err = ServiceError::Transform {
            input: PathBuf::from("/raw/icon.png"),
            dest: PathBuf::from("/out/icon.png"),
            detail: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "transform failed for /raw/icon.png -> /out/icon.png: boom"
        );
        // The path fields are context, not a chained cause.
        assert!(std::error::Error::source(&err).is_none());
    }
}
