//! CLI output formatting for pipeline runs.
//!
//! Each concern has a `format_*` function returning strings (pure, no I/O,
//! testable) and a `print_*` wrapper that writes to stdout. Per-asset lines
//! lead with the classification verdict so a scrolling run reads as an
//! inventory:
//!
//! ```text
//! WARP 0.3.0 (incremental asset pipeline)
//! up-to-date  banner.png
//! new         icon.png (4 variants)
//! changed     logo.png (4 variants)
//! removed     old-button.png
//! warning     splash.png: missing output assets/drawable-hdpi/splash.png
//! FAILED      broken.png: transform failed for raw/broken.png → ...
//!
//! 1 up-to-date, 1 new, 1 changed, 1 removed, 1 warning, 1 failed
//! ```
//!
//! Workers send [`Event`]s over a channel and a single printer thread calls
//! [`print_event`], so parallel asset processing never interleaves lines.

use crate::pipeline::{Event, RunReport};

/// Opening banner. Suppressed by `--silent`.
pub fn format_banner(version: &str) -> String {
    format!("WARP {version} (incremental asset pipeline)")
}

/// One line per pipeline event.
pub fn format_event(event: &Event) -> String {
    match event {
        Event::UpToDate { name } => format!("up-to-date  {name}"),
        Event::Generated { name, variants } => {
            format!("new         {name} ({variants} variants)")
        }
        Event::Regenerated { name, variants } => {
            format!("changed     {name} ({variants} variants)")
        }
        Event::Removed { name } => format!("removed     {name}"),
        Event::MissingOutput { name, path } => {
            format!("warning     {name}: missing output {}", path.display())
        }
        Event::Failed { name, detail } => format!("FAILED      {name}: {detail}"),
    }
}

/// Final summary: one counts line, then one line per failure.
pub fn format_summary(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    let mut parts = vec![
        format!("{} up-to-date", report.up_to_date),
        format!("{} new", report.generated),
        format!("{} changed", report.regenerated),
        format!("{} removed", report.removed),
    ];
    if report.warnings > 0 {
        parts.push(format!("{} warnings", report.warnings));
    }
    if !report.failures.is_empty() {
        parts.push(format!("{} failed", report.failures.len()));
    }
    lines.push(parts.join(", "));

    for failure in &report.failures {
        lines.push(format!("  failed: {}: {}", failure.name, failure.detail));
    }

    lines
}

pub fn print_event(event: &Event) {
    println!("{}", format_event(event));
}

pub fn print_summary(report: &RunReport) {
    for line in format_summary(report) {
        println!("{line}");
    }
}
