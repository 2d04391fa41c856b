//! Migration configuration and the persisted project settings file
//!
//! [`MigrationConfig`] is what a run executes; [`ProjectSettings`] is the
//! document `init` writes into a project so later runs pick up the same
//! choices. Command-line flags take precedence over settings, and settings
//! take precedence over the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MigrationError, Result};
use crate::transform::TransformName;

/// File name of the settings document inside a project
pub const SETTINGS_FILE: &str = "proteus-migrate.json";

/// Exclusion patterns applied when none are configured
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/*.min.js",
    "**/*.d.ts",
];

/// Options for a single migration run
///
/// Built once, validated, then handed to the runner by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub source_directory: PathBuf,
    /// Where rewritten files go; `None` rewrites in place
    pub target_directory: Option<PathBuf>,
    pub dry_run: bool,
    pub verbose: bool,
    /// Transforms to apply, in order
    pub transforms: Vec<TransformName>,
    /// Glob patterns (relative to the source directory) to skip
    pub exclude: Vec<String>,
    pub backup: bool,
}

impl MigrationConfig {
    pub fn new(source_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_directory: source_directory.into(),
            target_directory: None,
            dry_run: false,
            verbose: false,
            transforms: TransformName::ALL.to_vec(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            backup: true,
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target_directory = Some(target.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_transforms(mut self, transforms: Vec<TransformName>) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Directory rewritten files are written under
    pub fn target_directory(&self) -> &Path {
        self.target_directory
            .as_deref()
            .unwrap_or(&self.source_directory)
    }

    /// Check everything that must hold before any file is touched
    pub fn validate(&self) -> Result<()> {
        if !self.source_directory.exists() {
            return Err(MigrationError::NotFound(self.source_directory.clone()));
        }
        if !self.source_directory.is_dir() {
            return Err(MigrationError::NotADirectory(self.source_directory.clone()));
        }
        if self.transforms.is_empty() {
            return Err(MigrationError::EmptyTransformList);
        }
        for pattern in &self.exclude {
            globset::Glob::new(pattern).map_err(|source| MigrationError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Split a comma-separated list, trimming whitespace and dropping empty items
fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Parse a comma-separated list of transform names
///
/// Every unknown name is reported in a single error. Duplicates keep their
/// first position.
pub fn parse_transform_list(list: &str) -> Result<Vec<TransformName>> {
    parse_transform_names(split_list(list))
}

/// Resolve transform names from any string source (flags, settings file)
pub fn parse_transform_names<I, S>(names: I) -> Result<Vec<TransformName>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut transforms = Vec::new();
    let mut unknown = Vec::new();

    for raw in names {
        match raw.as_ref().parse::<TransformName>() {
            Ok(name) => {
                if !transforms.contains(&name) {
                    transforms.push(name);
                }
            }
            Err(err) => unknown.push(err.0),
        }
    }

    if unknown.is_empty() {
        Ok(transforms)
    } else {
        Err(MigrationError::UnknownTransforms {
            unknown,
            available: TransformName::all_names(),
        })
    }
}

/// Parse a comma-separated list of glob patterns
pub fn parse_pattern_list(list: &str) -> Vec<String> {
    split_list(list).map(str::to_string).collect()
}

/// Settings persisted by `init` into [`SETTINGS_FILE`]
///
/// Transform names are kept as strings so that a stale or hand-edited file
/// produces the same descriptive error as a bad command-line override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSettings {
    pub source_directory: PathBuf,
    pub transforms: Vec<String>,
    pub exclude: Vec<String>,
    pub backup: bool,
    pub verbose: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("src"),
            transforms: TransformName::all_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            backup: true,
            verbose: false,
        }
    }
}

impl ProjectSettings {
    /// Path of the settings file inside `project_dir`
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(SETTINGS_FILE)
    }

    /// Load settings from `project_dir`, or `None` if the file is absent
    pub fn load(project_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&Self::path(project_dir))
    }

    /// Load settings from an explicit file, or `None` if it is absent
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(path).map_err(|e| MigrationError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = serde_json::from_str(&text).map_err(|e| MigrationError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Some(settings))
    }

    /// Write settings to `project_dir`, returning the file path
    pub fn save(&self, project_dir: &Path) -> Result<PathBuf> {
        let path = Self::path(project_dir);
        let mut text = serde_json::to_string_pretty(self).map_err(|e| MigrationError::Settings {
            path: path.clone(),
            message: e.to_string(),
        })?;
        text.push('\n');
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Validated transform list
    pub fn transform_names(&self) -> Result<Vec<TransformName>> {
        parse_transform_names(&self.transforms)
    }

    /// Build a run configuration, resolving `source_directory` against
    /// `project_dir` when it is relative
    pub fn to_config(&self, project_dir: &Path) -> Result<MigrationConfig> {
        let source = if self.source_directory.is_absolute() {
            self.source_directory.clone()
        } else {
            project_dir.join(&self.source_directory)
        };

        Ok(MigrationConfig::new(source)
            .with_transforms(self.transform_names()?)
            .with_exclude(self.exclude.clone())
            .with_backup(self.backup)
            .with_verbose(self.verbose))
    }
}
