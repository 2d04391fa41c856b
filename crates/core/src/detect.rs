//! Usage detection for ProteusJS in a consumer project
//!
//! Detection is read-only and best-effort. The manifest check and the source
//! scan are independent signals: either one is enough to report usage, and a
//! broken manifest or an unreadable file never fails the operation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::discovery;
use crate::error::{MigrationError, Result};
use crate::transform::builtin::{CURRENT_PACKAGE, LEGACY_PACKAGE};

/// Manifest sections that declare dependencies
const DEPENDENCY_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Files scanned for usage signatures
const SCAN_PATTERNS: &[&str] = &["**/*.{js,jsx,ts,tsx,mjs,cjs,vue,svelte,html}"];

/// Directories never worth scanning
const NOISY_DIRECTORIES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/.*/**",
];

/// Signatures of library usage in source text
static SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // import ... from 'proteusjs' / bare import
        r#"\bimport\b[^;'"]*['"]proteusjs(/[^'"]*)?['"]"#,
        // require('proteusjs')
        r#"\brequire\s*\(\s*['"]proteusjs(/[^'"]*)?['"]\s*\)"#,
        // new ProteusJS(...)
        r"\bnew\s+ProteusJS\s*\(",
        // ProteusJS.someMember
        r"\bProteusJS\s*\.\s*[A-Za-z_$][\w$]*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("usage signature regex is valid"))
    .collect()
});

/// Outcome of scanning a project for library usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub has_usage: bool,
    /// Version string as declared in the manifest, verbatim
    pub declared_version: Option<String>,
    /// Package key that matched in the manifest
    pub manifest_dependency: Option<String>,
    /// Files containing at least one usage signature, sorted
    pub files: Vec<PathBuf>,
}

impl DetectionResult {
    /// Command a user should run next, if migration applies
    pub fn suggested_command(&self, root: &Path) -> Option<String> {
        self.has_usage
            .then(|| format!("proteus-migrate migrate {} --dry-run", root.display()))
    }
}

/// Scan `root` for ProteusJS usage
///
/// Fails only when `root` does not exist.
pub fn detect_usage(root: &Path) -> Result<DetectionResult> {
    if !root.exists() {
        return Err(MigrationError::NotFound(root.to_path_buf()));
    }

    let mut result = DetectionResult::default();

    if let Some((package, version)) = read_manifest_dependency(root) {
        debug!("manifest declares {} {}", package, version);
        result.has_usage = true;
        result.manifest_dependency = Some(package);
        result.declared_version = Some(version);
    }

    let candidates = discovery::discover_files(root, SCAN_PATTERNS, NOISY_DIRECTORIES)?;
    for path in candidates {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                debug!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        if contains_usage(&source) {
            debug!("usage found in {}", path.display());
            result.files.push(path);
        }
    }

    if !result.files.is_empty() {
        result.has_usage = true;
    }

    Ok(result)
}

/// Whether `source` matches any usage signature
pub fn contains_usage(source: &str) -> bool {
    SIGNATURES.iter().any(|re| re.is_match(source))
}

/// Look the library up in `package.json`; any failure means "no signal"
fn read_manifest_dependency(root: &Path) -> Option<(String, String)> {
    let manifest_path = root.join("package.json");
    let text = fs::read_to_string(&manifest_path).ok()?;
    let manifest: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            debug!("ignoring unparsable {}: {}", manifest_path.display(), err);
            return None;
        }
    };

    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = manifest.get(section).and_then(|v| v.as_object()) else {
            continue;
        };
        for package in [LEGACY_PACKAGE, CURRENT_PACKAGE] {
            if let Some(version) = deps.get(package) {
                let version = version
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| version.to_string());
                return Some((package.to_string(), version));
            }
        }
    }

    None
}

/// Human-readable detection report
pub fn render_detection(result: &DetectionResult, root: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ProteusJS usage report for {}", root.display());
    let _ = writeln!(out);

    if !result.has_usage {
        let _ = writeln!(out, "No ProteusJS usage detected. Nothing to migrate.");
        return out;
    }

    match (&result.manifest_dependency, &result.declared_version) {
        (Some(package), Some(version)) => {
            let _ = writeln!(out, "Declared dependency: {} {}", package, version);
        }
        _ => {
            let _ = writeln!(out, "Declared dependency: none (usage found in sources only)");
        }
    }

    let _ = writeln!(out, "Files using ProteusJS: {}", result.files.len());
    // Detected paths are canonical
    let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    for file in &result.files {
        let shown = file.strip_prefix(&canonical_root).unwrap_or(file);
        let _ = writeln!(out, "  - {}", shown.display());
    }

    if let Some(command) = result.suggested_command(root) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next step: {}", command);
    }

    out
}
