//! `init` subcommand.
//!
//! Builds a [`ProjectSettings`] from prompts (or defaults with `--yes`) and
//! writes it into the project.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use proteus_migrator_core::config::{parse_pattern_list, parse_transform_list};
use proteus_migrator_core::{ProjectSettings, TransformRegistry};

use crate::prompt::Prompter;

pub fn cmd_init(dir: &Path, yes: bool, registry: &TransformRegistry) -> anyhow::Result<()> {
    if !dir.is_dir() {
        bail!("project directory {} does not exist", dir.display());
    }

    let settings_path = ProjectSettings::path(dir);
    let settings = if yes {
        ProjectSettings::default()
    } else {
        let mut prompter = Prompter::stdio();
        if settings_path.exists()
            && !prompter.confirm(
                &format!("{} already exists. Overwrite?", settings_path.display()),
                false,
            )?
        {
            eprintln!("Init cancelled.");
            return Ok(());
        }
        build_settings(&mut prompter, registry)?
    };

    let written = settings
        .save(dir)
        .with_context(|| format!("cannot write {}", settings_path.display()))?;
    println!("Wrote {}", written.display());
    println!(
        "Run `proteus-migrate migrate --dry-run` from {} to preview the migration.",
        dir.display()
    );
    Ok(())
}

/// Ask for each setting, re-asking until transform names are valid
pub fn build_settings<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    registry: &TransformRegistry,
) -> anyhow::Result<ProjectSettings> {
    let defaults = ProjectSettings::default();

    let source = prompter.ask(
        "Source directory",
        &defaults.source_directory.display().to_string(),
    )?;

    prompter.say("Available transforms:")?;
    for transform in registry.iter() {
        prompter.say(&format!("  {:<20} {}", transform.name(), transform.description()))?;
    }
    let transforms = loop {
        let answer = prompter.ask("Transforms to apply (comma-separated)", "all")?;
        if answer == "all" {
            break defaults.transforms.clone();
        }
        match parse_transform_list(&answer) {
            Ok(names) if !names.is_empty() => {
                break names.iter().map(|n| n.as_str().to_string()).collect();
            }
            Ok(_) => prompter.say("Select at least one transform.")?,
            Err(err) => prompter.say(&err.to_string())?,
        }
    };

    let exclude = prompter.ask("Exclude patterns (comma-separated)", &defaults.exclude.join(","))?;
    let backup = prompter.confirm("Create .backup files before rewriting?", defaults.backup)?;
    let verbose = prompter.confirm("Verbose output?", defaults.verbose)?;

    Ok(ProjectSettings {
        source_directory: PathBuf::from(source),
        transforms,
        exclude: parse_pattern_list(&exclude),
        backup,
        verbose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answers(input: &str) -> anyhow::Result<ProjectSettings> {
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        build_settings(&mut prompter, &TransformRegistry::builtin())
    }

    #[test]
    fn test_defaults_on_empty_answers() {
        let settings = answers("").unwrap();
        assert_eq!(settings, ProjectSettings::default());
    }

    #[test]
    fn test_custom_answers() {
        let settings = answers("app\nbogus\npackage-imports, instance-init\nlegacy/**\nn\ny\n").unwrap();

        assert_eq!(settings.source_directory, PathBuf::from("app"));
        assert_eq!(
            settings.transforms,
            vec!["package-imports".to_string(), "instance-init".to_string()]
        );
        assert_eq!(settings.exclude, vec!["legacy/**".to_string()]);
        assert!(!settings.backup);
        assert!(settings.verbose);
    }
}
