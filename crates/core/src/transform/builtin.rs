//! Built-in ProteusJS v1 → v2 transforms
//!
//! These are text-level rewrites keyed on the call shapes the v1 API
//! exposes. They are idempotent: running them over already migrated code
//! yields [`TransformOutcome::Unchanged`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{line_of, Transform, TransformContext, TransformName, TransformOutcome};

/// Package name of the v1 library
pub const LEGACY_PACKAGE: &str = "proteusjs";

/// Package name of the v2 library
pub const CURRENT_PACKAGE: &str = "@sc4rfurryx/proteusjs";

static MODULE_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<prefix>\bfrom\s+|\bimport\s*\(?\s*|\brequire\s*\(\s*)(?P<quote>['"])proteusjs(?P<subpath>/[^'"\n]*)?['"]"#,
    )
    .expect("module specifier regex is valid")
});

static CONSTRUCTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bnew\s+ProteusJS\s*\(").expect("constructor regex is valid")
});

/// Every built-in transform, in canonical order
pub fn all() -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(PackageImports),
        Box::new(InstanceInit),
        Box::new(MethodRenames::container_queries()),
        Box::new(MethodRenames::fluid_typography()),
        Box::new(MethodRenames::performance_api()),
    ]
}

/// Rewrites `proteusjs` module specifiers to the scoped v2 package
pub struct PackageImports;

impl Transform for PackageImports {
    fn name(&self) -> TransformName {
        TransformName::PackageImports
    }

    fn description(&self) -> &'static str {
        "Rewrite 'proteusjs' imports and requires to '@sc4rfurryx/proteusjs'"
    }

    fn apply(&self, _ctx: &TransformContext<'_>, source: &str) -> anyhow::Result<TransformOutcome> {
        let mut changes = Vec::new();
        for caps in MODULE_SPECIFIER.captures_iter(source) {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let subpath = caps.name("subpath").map_or("", |m| m.as_str());
            changes.push(format!(
                "line {}: '{}{}' -> '{}{}'",
                line_of(source, whole),
                LEGACY_PACKAGE,
                subpath,
                CURRENT_PACKAGE,
                subpath
            ));
        }

        if changes.is_empty() {
            return Ok(TransformOutcome::Unchanged);
        }

        let rewritten = MODULE_SPECIFIER.replace_all(source, |caps: &Captures| {
            let quote = &caps["quote"];
            format!(
                "{}{}{}{}{}",
                &caps["prefix"],
                quote,
                CURRENT_PACKAGE,
                caps.name("subpath").map_or("", |m| m.as_str()),
                quote
            )
        });

        Ok(TransformOutcome::Changed {
            source: rewritten.into_owned(),
            changes,
        })
    }
}

/// Replaces `new ProteusJS(opts)` with the `ProteusJS.init(opts)` factory
///
/// v2 keeps one instance per module, so more than one construction in a
/// file cannot be migrated mechanically.
pub struct InstanceInit;

impl Transform for InstanceInit {
    fn name(&self) -> TransformName {
        TransformName::InstanceInit
    }

    fn description(&self) -> &'static str {
        "Replace 'new ProteusJS(...)' with 'ProteusJS.init(...)'"
    }

    fn apply(&self, ctx: &TransformContext<'_>, source: &str) -> anyhow::Result<TransformOutcome> {
        let lines: Vec<usize> = CONSTRUCTOR
            .find_iter(source)
            .map(|m| line_of(source, m.start()))
            .collect();

        match lines.len() {
            0 => Ok(TransformOutcome::Unchanged),
            1 => {
                let rewritten = CONSTRUCTOR.replace(source, "ProteusJS.init(");
                Ok(TransformOutcome::Changed {
                    source: rewritten.into_owned(),
                    changes: vec![format!(
                        "line {}: new ProteusJS(...) -> ProteusJS.init(...)",
                        lines[0]
                    )],
                })
            }
            n => {
                let at = lines
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                anyhow::bail!(
                    "{}: {} ProteusJS instances constructed (lines {}); merge them into one before migrating",
                    ctx.path.display(),
                    n,
                    at
                )
            }
        }
    }
}

/// Renames v1 instance methods to their v2 namespaced equivalents
pub struct MethodRenames {
    name: TransformName,
    description: &'static str,
    renames: &'static [(&'static str, &'static str)],
}

impl MethodRenames {
    pub fn container_queries() -> Self {
        Self {
            name: TransformName::ContainerQueries,
            description: "Rename container query methods to the v2 container API",
            renames: &[
                ("createContainer", "container"),
                ("removeContainer", "unobserve"),
            ],
        }
    }

    pub fn fluid_typography() -> Self {
        Self {
            name: TransformName::FluidTypography,
            description: "Move fluid typography methods under the typography namespace",
            renames: &[
                ("fluidType", "typography.fluid"),
                ("createTypeScale", "typography.scale"),
            ],
        }
    }

    pub fn performance_api() -> Self {
        Self {
            name: TransformName::PerformanceApi,
            description: "Move performance monitoring methods under the vitals namespace",
            renames: &[
                ("getPerformanceMetrics", "vitals.snapshot"),
                ("enablePerformanceMonitoring", "vitals.observe"),
            ],
        }
    }
}

impl Transform for MethodRenames {
    fn name(&self) -> TransformName {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn apply(&self, _ctx: &TransformContext<'_>, source: &str) -> anyhow::Result<TransformOutcome> {
        let mut current = source.to_string();
        let mut changes = Vec::new();

        for (from, to) in self.renames {
            let needle = format!(".{}(", from);
            if !current.contains(&needle) {
                continue;
            }
            for (offset, _) in current.match_indices(&needle) {
                changes.push(format!(
                    "line {}: .{}() -> .{}()",
                    line_of(&current, offset),
                    from,
                    to
                ));
            }
            current = current.replace(&needle, &format!(".{}(", to));
        }

        if changes.is_empty() {
            Ok(TransformOutcome::Unchanged)
        } else {
            Ok(TransformOutcome::Changed {
                source: current,
                changes,
            })
        }
    }
}
