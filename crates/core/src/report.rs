//! Markdown migration report
//!
//! [`render_report`] is pure: identical results and timestamp give identical
//! text. [`generate_report`] stamps the current time.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::runner::MigrationResult;

/// Default report file name
pub const REPORT_FILE: &str = "MIGRATION_REPORT.md";

/// Percentage of files transformed; `0.0` for an empty run
pub fn success_rate(results: &[MigrationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let transformed = results.iter().filter(|r| r.transformed).count();
    transformed as f64 / results.len() as f64 * 100.0
}

/// Render a report stamped with the current time
pub fn generate_report(results: &[MigrationResult]) -> String {
    render_report(results, Utc::now())
}

/// Render a report for `results` generated at `generated_at`
pub fn render_report(results: &[MigrationResult], generated_at: DateTime<Utc>) -> String {
    let total = results.len();
    let transformed: Vec<&MigrationResult> = results.iter().filter(|r| r.transformed).collect();
    let errored: Vec<&MigrationResult> = results.iter().filter(|r| r.has_errors()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "# ProteusJS Migration Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Total files: {}", total);
    let _ = writeln!(out, "- Transformed: {}", transformed.len());
    let _ = writeln!(out, "- Errors: {}", errored.len());
    // Round half away from zero; `{:.1}` alone rounds ties to even
    let rate = (success_rate(results) * 10.0).round() / 10.0;
    let _ = writeln!(out, "- Success rate: {:.1}%", rate);

    if !transformed.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Transformed Files");
        for result in &transformed {
            let _ = writeln!(out);
            let _ = writeln!(out, "### {}", result.file_path.display());
            let _ = writeln!(out);
            for change in &result.changes {
                let _ = writeln!(out, "- {}", change);
            }
        }
    }

    if !errored.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Errors");
        for result in &errored {
            let _ = writeln!(out);
            let _ = writeln!(out, "### {}", result.file_path.display());
            let _ = writeln!(out);
            for error in &result.errors {
                let _ = writeln!(out, "- {}", error);
            }
        }
    }

    out
}

/// Write a rendered report to `path`
pub fn write_report(path: &Path, report: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)
}
