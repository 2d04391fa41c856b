//! CLI migrate subcommand.
//!
//! Orchestrates the migration pipeline:
//! resolve config -> validate -> discover -> confirm -> run -> report.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use proteus_migrator_core::config::{
    parse_pattern_list, parse_transform_list, MigrationConfig, ProjectSettings, SETTINGS_FILE,
};
use proteus_migrator_core::report::{generate_report, write_report, REPORT_FILE};
use proteus_migrator_core::{MigrationRunner, MigrationSummary, TransformRegistry};

use crate::logging::Logging;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Source directory to migrate (defaults to sourceDirectory from the settings file)
    pub source: Option<PathBuf>,

    /// Write rewritten files here instead of in place
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Comma-separated transforms to apply, in order. Default: all.
    #[arg(long)]
    pub transforms: Option<String>,

    /// Comma-separated glob patterns to skip
    #[arg(long)]
    pub exclude: Option<String>,

    /// Do not write .backup files
    #[arg(long)]
    pub no_backup: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Where to write the Markdown report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Settings file to read (default: proteus-migrate.json in SOURCE or its
    /// parent, or in the current directory when SOURCE is omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the migration pipeline.
pub fn cmd_migrate(
    args: MigrateArgs,
    verbose: bool,
    logging: &Logging,
    registry: &TransformRegistry,
) -> anyhow::Result<()> {
    let config = resolve_config(&args, verbose)?;
    config.validate()?;
    if config.verbose {
        logging.enable_verbose();
    }

    let runner = MigrationRunner::new(config, registry);
    let files = runner.discover()?;
    let config = runner.config();

    println!(
        "Found {} file(s) in {}",
        files.len(),
        config.source_directory.display()
    );
    println!(
        "Transforms: {}",
        config
            .transforms
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if config.dry_run {
        println!("Dry run: no files will be modified.");
    }

    if files.is_empty() {
        println!("Nothing to migrate.");
        return Ok(());
    }

    if !args.yes && !config.dry_run {
        let mut prompter = Prompter::stdio();
        let question = if config.backup {
            "Rewrite these files (backups will be created)?"
        } else {
            "Rewrite these files WITHOUT backups?"
        };
        if !prompter.confirm(question, false)? {
            println!("Migration cancelled.");
            return Ok(());
        }
    }

    let summary = runner.run_files(files);
    print_summary(&summary, config.source_directory.as_path());

    let report_path = match (&args.report, config.dry_run) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(config.source_directory.join(REPORT_FILE)),
        (None, true) => None,
    };
    if let Some(path) = report_path {
        let report = generate_report(&summary.results);
        write_report(&path, &report)
            .with_context(|| format!("cannot write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Merge flags over the settings file over defaults
fn resolve_config(args: &MigrateArgs, verbose: bool) -> anyhow::Result<MigrationConfig> {
    // Transform names are checked first so a typo never reaches the filesystem
    let transforms = args
        .transforms
        .as_deref()
        .map(parse_transform_list)
        .transpose()?;

    let settings = find_settings(args)?;

    let mut config = match (&settings, &args.source) {
        (Some((settings, dir)), _) => settings.to_config(dir)?,
        (None, Some(source)) => MigrationConfig::new(source),
        (None, None) => bail!(
            "no source directory given and no {} found in the current directory",
            SETTINGS_FILE
        ),
    };

    if let Some(source) = &args.source {
        config.source_directory = source.clone();
    }
    if let Some(target) = &args.target {
        config = config.with_target(target);
    }
    if let Some(transforms) = transforms {
        config = config.with_transforms(transforms);
    }
    if let Some(exclude) = &args.exclude {
        config = config.with_exclude(parse_pattern_list(exclude));
    }
    if args.no_backup {
        config = config.with_backup(false);
    }

    // Either the flag or the settings file turns it on
    let verbose = verbose || config.verbose;
    Ok(config.with_dry_run(args.dry_run).with_verbose(verbose))
}

/// Locate the settings file and the directory its paths are relative to
///
/// `--config` must exist. Otherwise SOURCE is searched, then its parent
/// (where `init` writes the file), and without SOURCE the current directory.
fn find_settings(args: &MigrateArgs) -> anyhow::Result<Option<(ProjectSettings, PathBuf)>> {
    if let Some(path) = &args.config {
        let settings = ProjectSettings::load_file(path)?
            .with_context(|| format!("settings file {} not found", path.display()))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        return Ok(Some((settings, dir)));
    }

    let candidates: Vec<PathBuf> = match &args.source {
        Some(source) => {
            let parent = source
                .canonicalize()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf));
            std::iter::once(source.clone()).chain(parent).collect()
        }
        None => vec![PathBuf::from(".")],
    };

    for dir in candidates {
        if let Some(settings) = ProjectSettings::load(&dir)? {
            tracing::debug!("using {}", ProjectSettings::path(&dir).display());
            return Ok(Some((settings, dir)));
        }
    }
    Ok(None)
}

fn print_summary(summary: &MigrationSummary, source: &Path) {
    // Discovered paths are canonical
    let source = source.canonicalize().unwrap_or_else(|_| source.to_path_buf());
    for name in &summary.skipped_transforms {
        println!("warning: transform '{}' is unavailable and was skipped", name);
    }

    let verb = if summary.dry_run {
        "would be transformed"
    } else {
        "transformed"
    };
    for result in summary.results.iter().filter(|r| r.transformed) {
        let shown = result.file_path.strip_prefix(&source).unwrap_or(&result.file_path);
        println!("  {} ({} change(s))", shown.display(), result.changes.len());
    }
    for result in summary.results.iter().filter(|r| r.has_errors()) {
        let shown = result.file_path.strip_prefix(&source).unwrap_or(&result.file_path);
        for error in &result.errors {
            println!("  {} failed: {}", shown.display(), error);
        }
    }

    println!(
        "{} of {} file(s) {}, {} with errors",
        summary.transformed_count(),
        summary.total(),
        verb,
        summary.error_count()
    );
}
