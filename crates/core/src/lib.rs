//! ProteusJS Migrator Core Library
//!
//! This library detects ProteusJS usage in a project and migrates its
//! sources from the v1 API to v2: discover files, fold transforms over each
//! one, back up and rewrite, then report.

pub mod config;
pub mod detect;
pub mod discovery;
pub mod error;
pub mod report;
pub mod runner;
pub mod transform;

// Re-export commonly used types
pub use config::{MigrationConfig, ProjectSettings};
pub use detect::{detect_usage, DetectionResult};
pub use error::MigrationError;
pub use runner::{MigrationResult, MigrationRunner, MigrationSummary};
pub use transform::{TransformName, TransformRegistry};
