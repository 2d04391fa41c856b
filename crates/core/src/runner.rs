//! Sequential migration runner
//!
//! The runner discovers candidate files, folds the configured transforms over
//! each file's text, and persists the result. Files are processed one at a
//! time in discovery order, so the results list lines up with the discovered
//! file list.
//!
//! # Per-file Policy
//!
//! - A transform error aborts the remaining transforms for that file. Any
//!   changes made earlier in the fold are discarded: the result carries the
//!   error, `transformed` is `false`, and nothing is written.
//! - A transform missing from the registry is skipped with a warning; it is
//!   not a file error.
//! - The backup (`<file>.backup`) is written before the file itself, so it is
//!   a reliable pre-image even if the process dies mid-write.
//! - In dry-run mode nothing touches the filesystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::MigrationConfig;
use crate::discovery;
use crate::error::Result;
use crate::transform::{TransformContext, TransformName, TransformOutcome, TransformRegistry};

/// Suffix appended to backup copies
pub const BACKUP_SUFFIX: &str = ".backup";

/// Outcome of processing one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub file_path: PathBuf,
    pub transformed: bool,
    pub changes: Vec<String>,
    pub errors: Vec<String>,
    /// Backup written for this file, if any
    pub backup_path: Option<PathBuf>,
    /// Where the rewritten text was written, if anywhere
    pub output_path: Option<PathBuf>,
}

impl MigrationResult {
    fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            ..Self::default()
        }
    }

    /// Record a failure, discarding any pending changes
    fn fail(&mut self, error: String) {
        self.transformed = false;
        self.changes.clear();
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    /// One entry per discovered file, in discovery order
    pub results: Vec<MigrationResult>,
    /// Configured transforms the registry could not resolve
    pub skipped_transforms: Vec<TransformName>,
    pub dry_run: bool,
}

impl MigrationSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn transformed_count(&self) -> usize {
        self.results.iter().filter(|r| r.transformed).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.has_errors()).count()
    }
}

/// Applies a [`MigrationConfig`] using transforms from a [`TransformRegistry`]
pub struct MigrationRunner<'r> {
    config: MigrationConfig,
    registry: &'r TransformRegistry,
}

impl<'r> MigrationRunner<'r> {
    pub fn new(config: MigrationConfig, registry: &'r TransformRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Files the run would process, after exclusions
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        discovery::discover_source_files(&self.config.source_directory, &self.config.exclude)
    }

    /// Validate, discover, and process every file
    ///
    /// Only configuration problems return `Err`; per-file failures are
    /// recorded on the corresponding [`MigrationResult`].
    pub fn run(&self) -> Result<MigrationSummary> {
        self.config.validate()?;
        let files = self.discover()?;
        Ok(self.run_files(files))
    }

    /// Process an already discovered file list
    pub fn run_files(&self, files: Vec<PathBuf>) -> MigrationSummary {
        let skipped_transforms: Vec<TransformName> = self
            .config
            .transforms
            .iter()
            .copied()
            .filter(|name| !self.registry.contains(*name))
            .collect();
        for name in &skipped_transforms {
            warn!("transform '{}' is not registered; it will not be applied", name);
        }

        info!(
            "migrating {} file(s) with {} transform(s){}",
            files.len(),
            self.config.transforms.len() - skipped_transforms.len(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let total = files.len();
        let mut results = Vec::with_capacity(total);
        for (index, path) in files.into_iter().enumerate() {
            if self.config.verbose {
                info!("[{}/{}] {}", index + 1, total, path.display());
            }
            let result = self.process_file(path);
            debug!(
                file = %result.file_path.display(),
                transformed = result.transformed,
                changes = result.changes.len(),
                errors = result.errors.len(),
                "processed"
            );
            results.push(result);
        }

        let summary = MigrationSummary {
            results,
            skipped_transforms,
            dry_run: self.config.dry_run,
        };
        info!(
            "migration finished: {} transformed, {} with errors, {} total",
            summary.transformed_count(),
            summary.error_count(),
            summary.total()
        );
        summary
    }

    fn process_file(&self, path: PathBuf) -> MigrationResult {
        let mut result = MigrationResult::new(path);

        let original = match fs::read_to_string(&result.file_path) {
            Ok(text) => text,
            Err(err) => {
                result.fail(format!("failed to read file: {}", err));
                return result;
            }
        };

        let ctx = TransformContext {
            path: &result.file_path,
        };
        let mut current = original.clone();
        let mut changes = Vec::new();

        for name in &self.config.transforms {
            let Some(transform) = self.registry.get(*name) else {
                continue;
            };
            match transform.apply(&ctx, &current) {
                Ok(TransformOutcome::Unchanged) => {
                    debug!("{}: {} made no changes", ctx.path.display(), name);
                }
                Ok(TransformOutcome::Changed {
                    source,
                    changes: applied,
                }) => {
                    debug!("{}: {} made {} change(s)", ctx.path.display(), name, applied.len());
                    changes.extend(applied.into_iter().map(|c| format!("[{}] {}", name, c)));
                    current = source;
                }
                Err(err) => {
                    warn!("{}: transform '{}' failed: {:#}", ctx.path.display(), name, err);
                    result.fail(format!("transform '{}' failed: {:#}", name, err));
                    return result;
                }
            }
        }

        if changes.is_empty() || current == original {
            return result;
        }

        result.transformed = true;
        result.changes = changes;

        if self.config.dry_run {
            return result;
        }

        if let Err(err) = self.persist(&mut result, &current) {
            result.fail(err);
        }
        result
    }

    /// Write backup then output for a transformed file
    fn persist(&self, result: &mut MigrationResult, text: &str) -> std::result::Result<(), String> {
        let output_path = self.output_path(&result.file_path);

        if self.config.backup {
            let backup_path = backup_path(&result.file_path);
            fs::copy(&result.file_path, &backup_path)
                .map_err(|e| format!("failed to write backup {}: {}", backup_path.display(), e))?;
            result.backup_path = Some(backup_path);
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
        }
        fs::write(&output_path, text)
            .map_err(|e| format!("failed to write {}: {}", output_path.display(), e))?;
        result.output_path = Some(output_path);
        Ok(())
    }

    /// Mirror `file` from the source directory into the target directory
    fn output_path(&self, file: &Path) -> PathBuf {
        let Some(target) = self.config.target_directory.as_deref() else {
            return file.to_path_buf();
        };
        // Discovered paths are canonical; compare against the canonical source
        let source = self
            .config
            .source_directory
            .canonicalize()
            .unwrap_or_else(|_| self.config.source_directory.clone());
        match file.strip_prefix(&source) {
            Ok(relative) => target.join(relative),
            Err(_) => file.to_path_buf(),
        }
    }
}

/// Backup location for `file`
pub fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}
