//! Stderr logging whose verbosity can be raised after startup.
//!
//! The `--verbose` flag is known at parse time, but a settings file can ask
//! for verbose output too, and that is only read once a subcommand runs.

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_DIRECTIVES: &str = "proteus_migrator_core=warn,proteus_migrate=info";
const VERBOSE_DIRECTIVES: &str = "proteus_migrator_core=debug,proteus_migrate=debug";

pub struct Logging {
    handle: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set; it always wins
    from_env: bool,
}

impl Logging {
    /// Install the global subscriber
    pub fn init(verbose: bool) -> Self {
        let (filter, from_env) = match EnvFilter::try_from_default_env() {
            Ok(filter) => (filter, true),
            Err(_) => (EnvFilter::new(directives(verbose)), false),
        };
        let (filter, handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();

        Self { handle, from_env }
    }

    /// Switch to verbose output unless `RUST_LOG` is in charge
    pub fn enable_verbose(&self) {
        if self.from_env {
            return;
        }
        if let Err(err) = self.handle.reload(EnvFilter::new(VERBOSE_DIRECTIVES)) {
            tracing::warn!("cannot raise log level: {}", err);
        }
    }
}

fn directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    }
}
