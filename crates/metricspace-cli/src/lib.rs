//! Metricspace CLI
//!
//! Command-line front end for the Metricspace calculators: parses
//! arguments, loads configuration, opens the store, and dispatches to the
//! command handlers.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, ConfigAction, StateAction};
pub use commands::App;
pub use config::MetricspaceConfig;
pub use error::{Error, Result};

/// Runs a parsed command line and returns the text to print.
pub fn run(cli: Cli) -> Result<String> {
    let Cli {
        config,
        user,
        plan,
        verbose,
        command,
    } = cli;

    if let Command::Config { action } = command {
        logging::init_logging("warn", verbose);
        return config_handlers::handle_config_command(config.as_deref(), action);
    }

    let settings = MetricspaceConfig::load(config.as_deref())?;
    logging::init_logging(&settings.logging.level, verbose);
    tracing::debug!(
        backend = ?settings.storage.backend,
        period = ?settings.billing.period,
        "Configuration loaded"
    );

    let mut app = App::open(&settings, user.as_deref(), plan)?;
    app.run(command)
}
