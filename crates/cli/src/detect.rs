//! `detect` subcommand.

use std::path::Path;

use anyhow::Context;
use proteus_migrator_core::detect::{detect_usage, render_detection};

pub fn cmd_detect(dir: &Path, json: bool) -> anyhow::Result<()> {
    let result =
        detect_usage(dir).with_context(|| format!("cannot scan {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_detection(&result, dir));
    }
    Ok(())
}
