//! Transform registry for source-level migrations
//!
//! A transform is a pure function from old source text to new source text
//! implementing one migration rule. Transforms are identified by the closed
//! [`TransformName`] enum and resolved through an explicit
//! [`TransformRegistry`] that callers pass to the runner.
//!
//! # Built-in Transforms
//!
//! | name | rewrites |
//! |---|---|
//! | `package-imports` | `proteusjs` module specifiers → `@sc4rfurryx/proteusjs` |
//! | `instance-init` | `new ProteusJS(opts)` → `ProteusJS.init(opts)` |
//! | `container-queries` | `createContainer` / `removeContainer` calls |
//! | `fluid-typography` | `fluidType` / `createTypeScale` calls |
//! | `performance-api` | `getPerformanceMetrics` / `enablePerformanceMonitoring` calls |
//!
//! See [`builtin`] for the rewrite rules themselves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod builtin;

/// Identifier of a transform in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformName {
    PackageImports,
    InstanceInit,
    ContainerQueries,
    FluidTypography,
    PerformanceApi,
}

impl TransformName {
    /// Every transform, in the order they run by default
    pub const ALL: [TransformName; 5] = [
        TransformName::PackageImports,
        TransformName::InstanceInit,
        TransformName::ContainerQueries,
        TransformName::FluidTypography,
        TransformName::PerformanceApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformName::PackageImports => "package-imports",
            TransformName::InstanceInit => "instance-init",
            TransformName::ContainerQueries => "container-queries",
            TransformName::FluidTypography => "fluid-typography",
            TransformName::PerformanceApi => "performance-api",
        }
    }

    /// Kebab-case names of every transform
    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(TransformName::as_str).collect()
    }
}

impl fmt::Display for TransformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`TransformName::from_str`] for names outside the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransform(pub String);

impl fmt::Display for UnknownTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transform '{}'", self.0)
    }
}

impl std::error::Error for UnknownTransform {}

impl FromStr for TransformName {
    type Err = UnknownTransform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownTransform(s.to_string()))
    }
}

/// Per-file context handed to each transform
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// File being transformed
    pub path: &'a Path,
}

/// Outcome of applying one transform to one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// Nothing matched; source is untouched
    Unchanged,
    /// Source was rewritten
    Changed {
        source: String,
        /// Human-readable description of each rewrite
        changes: Vec<String>,
    },
}

/// A single migration rule
pub trait Transform: Send + Sync {
    /// Registry key of this transform
    fn name(&self) -> TransformName;

    /// One-line description shown by `list` and `init`
    fn description(&self) -> &'static str;

    /// Apply the rule to `source`
    ///
    /// Returning an error aborts the remaining transforms for this file.
    fn apply(&self, ctx: &TransformContext<'_>, source: &str) -> anyhow::Result<TransformOutcome>;
}

/// Static mapping from [`TransformName`] to transform implementations
///
/// The registry is an ordinary value: build it once and pass a reference to
/// every operation that needs it.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<TransformName, Box<dyn Transform>>,
}

impl TransformRegistry {
    /// Registry with no transforms
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in transform
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for transform in builtin::all() {
            registry.register(transform);
        }
        registry
    }

    /// Register a transform under its own name, replacing any previous entry
    pub fn register(&mut self, transform: Box<dyn Transform>) {
        self.transforms.insert(transform.name(), transform);
    }

    pub fn get(&self, name: TransformName) -> Option<&dyn Transform> {
        self.transforms.get(&name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: TransformName) -> bool {
        self.transforms.contains_key(&name)
    }

    /// Registered transforms in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Transform + 'static)> {
        self.transforms.values().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// 1-based line number of a byte offset
pub(crate) fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}
