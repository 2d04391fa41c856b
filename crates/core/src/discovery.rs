//! File discovery module with gitignore-aware filtering
//!
//! This module finds candidate source files in a project directory while
//! respecting .gitignore patterns and caller-supplied exclusion globs.
//! Results are absolute, deduplicated, and sorted so that every run visits
//! files in the same order.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{MigrationError, Result};

/// Source files the migration considers
pub const SOURCE_PATTERNS: &[&str] = &["**/*.{js,jsx,ts,tsx,mjs,cjs,vue,svelte}"];

/// Discover files matching glob patterns in a project directory
///
/// # Arguments
/// * `root` - Root directory to search
/// * `patterns` - Include globs relative to `root` (e.g., `&["**/*.ts"]`)
/// * `exclude` - Exclusion globs relative to `root` (e.g., `&["legacy/**"]`)
///
/// # Returns
/// Sorted absolute paths of matching files, minus anything matched by
/// .gitignore or `exclude`. A missing root yields an empty list; an invalid
/// glob is an error.
///
/// # Example
/// ```no_run
/// use proteus_migrator_core::discovery;
///
/// let files = discovery::discover_files(
///     std::path::Path::new("my_project"),
///     &["src/**/*.js"],
///     &["**/vendor/**"],
/// )?;
/// println!("Found {} files", files.len());
/// # Ok::<(), proteus_migrator_core::MigrationError>(())
/// ```
pub fn discover_files<P, E>(root: &Path, patterns: &[P], exclude: &[E]) -> Result<Vec<PathBuf>>
where
    P: AsRef<str>,
    E: AsRef<str>,
{
    let include = build_glob_matcher(patterns)?;
    let exclude = build_glob_matcher(exclude)?;

    // Canonicalize root upfront to ensure all returned paths are absolute
    let canonical_root = match root.canonicalize() {
        Ok(path) => path,
        Err(_) => return Ok(Vec::new()),
    };

    let mut files = BTreeSet::new();

    for result in build_walker(&canonical_root) {
        match result {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                // Globs are matched against the path relative to the root
                let Ok(rel_path) = entry.path().strip_prefix(&canonical_root) else {
                    continue;
                };
                if include.is_match(rel_path) && !exclude.is_match(rel_path) {
                    files.insert(entry.into_path());
                }
            }
            Err(err) => {
                // Log walk errors but continue processing other files
                warn!("error walking directory: {}", err);
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Discover migratable source files (convenience wrapper)
///
/// # Example
/// ```no_run
/// use proteus_migrator_core::discovery;
///
/// let files = discovery::discover_source_files(std::path::Path::new("my_project"), &["legacy/**"])?;
/// # Ok::<(), proteus_migrator_core::MigrationError>(())
/// ```
pub fn discover_source_files<E: AsRef<str>>(root: &Path, exclude: &[E]) -> Result<Vec<PathBuf>> {
    discover_files(root, SOURCE_PATTERNS, exclude)
}

/// Build a glob matcher from the provided patterns
fn build_glob_matcher<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|source| MigrationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| MigrationError::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(","),
        source,
    })
}

/// Build a WalkBuilder with proper ignore configuration
fn build_walker(root: &Path) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder
        .git_ignore(true)
        .git_exclude(true)
        .hidden(false)
        .parents(true) // Also check parent directories for .gitignore
        .filter_entry(|entry| entry.file_name() != ".git");

    // Explicitly add .gitignore if it exists (WalkBuilder only honours it
    // automatically inside a git repository)
    let gitignore_path = root.join(".gitignore");
    if gitignore_path.exists() {
        if let Some(err) = builder.add_ignore(&gitignore_path) {
            warn!("failed to read {}: {}", gitignore_path.display(), err);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    const NO_EXCLUDES: &[&str] = &[];

    #[test]
    fn test_discover_basic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        File::create(root.join("main.js")).unwrap();
        File::create(root.join("utils.ts")).unwrap();
        File::create(root.join("README.md")).unwrap();

        let files = discover_source_files(root, NO_EXCLUDES).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_absolute()));
        assert!(files.iter().any(|p| p.ends_with("main.js")));
        assert!(files.iter().any(|p| p.ends_with("utils.ts")));
    }

    #[test]
    fn test_respect_gitignore() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut gitignore = File::create(root.join(".gitignore")).unwrap();
        gitignore.write_all(b"vendor/\n*.gen.js\n").unwrap();

        fs::create_dir_all(root.join("vendor")).unwrap();
        File::create(root.join("vendor/lib.js")).unwrap();
        File::create(root.join("main.js")).unwrap();
        File::create(root.join("schema.gen.js")).unwrap();

        let files = discover_source_files(root, NO_EXCLUDES).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.js"));
    }

    #[test]
    fn test_exclusion_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/proteusjs")).unwrap();
        File::create(root.join("src/app.tsx")).unwrap();
        File::create(root.join("src/app.test.tsx")).unwrap();
        File::create(root.join("node_modules/proteusjs/index.js")).unwrap();

        let files =
            discover_source_files(root, &["**/node_modules/**", "**/*.test.tsx"]).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.tsx"));
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        File::create(root.join("b.js")).unwrap();
        File::create(root.join("a.js")).unwrap();

        // Overlapping patterns must not yield duplicates
        let files = discover_files(root, &["**/*.js", "*.js"], NO_EXCLUDES).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.js"));
        assert!(files[1].ends_with("b.js"));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover_files(temp_dir.path(), &["**/*.js"], &["src/["]);
        assert!(matches!(result, Err(MigrationError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_source_files(&temp_dir.path().join("nope"), NO_EXCLUDES).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/components/layout")).unwrap();
        File::create(root.join("src/components/Card.vue")).unwrap();
        File::create(root.join("src/components/layout/Grid.svelte")).unwrap();

        let files = discover_source_files(root, NO_EXCLUDES).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_absolute()));
    }
}
