mod detect;
mod init;
mod logging;
mod migrate;
mod prompt;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use proteus_migrator_core::TransformRegistry;

use crate::logging::Logging;

/// proteus-migrate - Upgrade ProteusJS consumers from v1 to v2
#[derive(Parser)]
#[command(name = "proteus-migrate")]
#[command(version)] // Auto-pull version from Cargo.toml
#[command(about = "Detect and migrate ProteusJS usage to the v2 API", long_about = None)]
struct Cli {
    /// Show per-file progress and transform details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migration transforms to a source directory
    Migrate(migrate::MigrateArgs),

    /// Report whether a project uses ProteusJS
    Detect {
        /// Project directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactively create a proteus-migrate.json settings file
    Init {
        /// Project directory to write the settings into
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Accept every default without prompting
        #[arg(long)]
        yes: bool,
    },

    /// List the available transforms
    List,
}

fn main() {
    let cli = Cli::parse();
    let logging = Logging::init(cli.verbose);
    install_panic_hook();

    if let Err(err) = run(cli, &logging) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli, logging: &Logging) -> anyhow::Result<()> {
    let registry = TransformRegistry::builtin();

    match cli.command {
        Commands::Migrate(args) => migrate::cmd_migrate(args, cli.verbose, logging, &registry),
        Commands::Detect { dir, json } => detect::cmd_detect(&dir, json),
        Commands::Init { dir, yes } => init::cmd_init(&dir, yes, &registry),
        Commands::List => {
            for transform in registry.iter() {
                println!("{:<20} {}", transform.name(), transform.description());
            }
            Ok(())
        }
    }
}

/// Any panic is logged and turned into a non-zero exit
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("unexpected failure: {}", info);
        process::exit(1);
    }));
}
