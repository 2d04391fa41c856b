//! Error types for the migration library.
//!
//! Only configuration-level failures surface as [`MigrationError`]. Failures
//! that happen while processing a single file are recorded on that file's
//! [`MigrationResult`](crate::runner::MigrationResult) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort an operation before any file is touched.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// One or more transform names are not in the registry.
    #[error("unknown transform(s): {}. Available transforms: {}", .unknown.join(", "), .available.join(", "))]
    UnknownTransforms {
        unknown: Vec<String>,
        available: Vec<&'static str>,
    },

    /// The configured transform list is empty.
    #[error("no transforms selected")]
    EmptyTransformList,

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The settings file exists but could not be read or parsed.
    #[error("invalid settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    /// I/O error outside of per-file processing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library result alias.
pub type Result<T> = std::result::Result<T, MigrationError>;
