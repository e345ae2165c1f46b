//! Optional `warp.toml` configuration.
//!
//! The CLI flags cover everything most projects need; `warp.toml` in the
//! raw-input root exists for the few knobs worth persisting alongside the
//! assets (recognized extensions, a thread cap for CI boxes). All fields
//! have defaults, user files only specify overrides, and unknown keys are
//! rejected so typos surface instead of silently doing nothing.
//!
//! ```toml
//! extensions = ["png", "jpg"]
//!
//! [processing]
//! max_threads = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file within the raw-input root.
pub const CONFIG_FILENAME: &str = "warp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {CONFIG_FILENAME}: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {CONFIG_FILENAME}: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {CONFIG_FILENAME}: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `warp.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarpConfig {
    /// Filename extensions recognized as source assets, written without
    /// the dot. Matching is case-insensitive; entries are lowercased on
    /// load.
    pub extensions: Vec<String>,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".to_string()],
            processing: ProcessingConfig::default(),
        }
    }
}

impl WarpConfig {
    /// Load from the raw-input root. A missing file yields the defaults; a
    /// present-but-invalid file is an error — a half-understood config must
    /// not silently reprocess or skip assets.
    pub fn load(raw_root: &Path) -> Result<Self, ConfigError> {
        let path = raw_root.join(CONFIG_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut config: Self = toml::from_str(&content)?;
        // Discovery compares lowercased file extensions, so fold case here
        // rather than letting "PNG" match nothing.
        for ext in &mut config.extensions {
            ext.make_ascii_lowercase();
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.starts_with('.')) {
            return Err(ConfigError::Validation(format!(
                "extensions are written without the dot: {ext:?}"
            )));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers. When absent, defaults to the
    /// number of CPU cores. Values larger than the core count are clamped.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}
