//! Platform output layout: density variants and destination paths.
//!
//! One source asset fans out to N scaled outputs, and the two supported
//! platforms disagree about where those outputs live:
//!
//! ```text
//! Android (per-bucket directories, same filename):
//!   assets/
//!   ├── drawable-hdpi/icon.png       # 0.375×
//!   ├── drawable-xhdpi/icon.png      # 0.5×
//!   ├── drawable-xxhdpi/icon.png     # 0.75×
//!   └── drawable-xxxhdpi/icon.png    # 1.0× (raw assets are authored at xxxhdpi)
//!
//! iOS (flat directory, suffixed filenames):
//!   assets/
//!   ├── icon.png                     # 1x
//!   ├── icon@2x.png                  # 2x
//!   └── icon@3x.png                  # 3x (raw assets are authored at 3x)
//! ```
//!
//! The layout rule is selected once per run via [`Platform`] and applied
//! uniformly; mixing layouts within a run is not supported. Adding a
//! platform means adding a variant table, not a new code path.
//!
//! Scale factors are relative to the densest target, so they always sit in
//! (0, 1] and the raw asset is authored at the largest size.

use std::path::{Path, PathBuf};

/// One named scaled output target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityVariant {
    /// Human-readable name used in reporting ("xhdpi", "2x").
    pub name: &'static str,
    /// Horizontal scale factor relative to the raw asset, in (0, 1].
    pub scale: f32,
    /// Android: the bucket subdirectory. iOS: the filename suffix
    /// (empty for the base 1x variant).
    selector: &'static str,
}

const ANDROID_VARIANTS: [DensityVariant; 4] = [
    DensityVariant {
        name: "hdpi",
        scale: 0.375,
        selector: "drawable-hdpi",
    },
    DensityVariant {
        name: "xhdpi",
        scale: 0.5,
        selector: "drawable-xhdpi",
    },
    DensityVariant {
        name: "xxhdpi",
        scale: 0.75,
        selector: "drawable-xxhdpi",
    },
    DensityVariant {
        name: "xxxhdpi",
        scale: 1.0,
        selector: "drawable-xxxhdpi",
    },
];

const IOS_VARIANTS: [DensityVariant; 3] = [
    DensityVariant {
        name: "1x",
        scale: 1.0 / 3.0,
        selector: "",
    },
    DensityVariant {
        name: "2x",
        scale: 2.0 / 3.0,
        selector: "@2x",
    },
    DensityVariant {
        name: "3x",
        scale: 1.0,
        selector: "@3x",
    },
];

/// Target platform, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Platform {
    /// Density-bucket subdirectories (drawable-hdpi … drawable-xxxhdpi).
    Android,
    /// Flat directory with @2x/@3x filename suffixes.
    Ios,
}

impl Platform {
    /// The fixed, ordered variant list for this platform.
    pub fn variants(self) -> &'static [DensityVariant] {
        match self {
            Platform::Android => &ANDROID_VARIANTS,
            Platform::Ios => &IOS_VARIANTS,
        }
    }

    /// Destination path for one variant of one source filename.
    pub fn output_path(
        self,
        out_root: &Path,
        filename: &str,
        variant: &DensityVariant,
    ) -> PathBuf {
        match self {
            Platform::Android => out_root.join(variant.selector).join(filename),
            Platform::Ios => out_root.join(suffixed_filename(filename, variant.selector)),
        }
    }

    /// All destination paths for one source filename, in variant order.
    pub fn output_paths(self, out_root: &Path, filename: &str) -> Vec<PathBuf> {
        self.variants()
            .iter()
            .map(|v| self.output_path(out_root, filename, v))
            .collect()
    }

    /// The directories that must exist before any variant can be written.
    pub fn output_dirs(self, out_root: &Path) -> Vec<PathBuf> {
        match self {
            Platform::Android => ANDROID_VARIANTS
                .iter()
                .map(|v| out_root.join(v.selector))
                .collect(),
            Platform::Ios => vec![out_root.to_path_buf()],
        }
    }
}

/// Insert a variant suffix between a filename's stem and extension.
///
/// `icon.png` + `@2x` → `icon@2x.png`. Extension-less names get the bare
/// suffix appended.
fn suffixed_filename(filename: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{suffix}.{ext}"),
        _ => format!("{filename}{suffix}"),
    }
}
