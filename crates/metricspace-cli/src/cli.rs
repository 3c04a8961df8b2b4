//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use metricspace_core::{Calculator, PlanId};

/// Metricspace - efficiency metrics calculators
#[derive(Parser, Debug)]
#[command(name = "metricspace")]
#[command(
    author,
    version,
    about = "Efficiency metrics calculators with subscription gating",
    long_about = None
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "METRICSPACE_CONFIG", global = true)]
    pub config: Option<String>,

    /// Signed-in user id; omit for an anonymous free-plan session
    #[arg(short, long, env = "METRICSPACE_USER", global = true)]
    pub user: Option<String>,

    /// Plan for the signed-in user, overriding the one on file
    #[arg(short, long, global = true)]
    pub plan: Option<PlanId>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the subscription plans
    Plans,
    /// Check whether the session may open a calculator
    Access {
        /// Calculator id (any string; unknown ids are checked literally)
        calculator: String,
    },
    /// Show the monthly calculation limit as JSON
    Limit,
    /// Show the stored usage record as JSON
    Usage,
    /// Run a calculator over its saved rows
    Calculate {
        /// Calculator id
        calculator: Calculator,
    },
    /// Inspect or edit a calculator's saved rows
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// List stored keys
    Keys {
        /// Only keys starting with this prefix
        #[arg(default_value = "metricspace_")]
        prefix: String,
    },
    /// Apply a payment provider status to a plan purchase
    Pay {
        /// Plan being purchased
        plan: PlanId,
        /// Status string reported by the payment provider
        status: String,
    },
    /// Cancel the paid subscription
    Cancel,
    /// Configuration file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `state` subcommands.
#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Print the rows as JSON
    Show {
        /// Calculator id
        calculator: Calculator,
    },
    /// Append an empty row
    AddRow {
        /// Calculator id
        calculator: Calculator,
    },
    /// Remove a row (the last remaining row is kept)
    RemoveRow {
        /// Calculator id
        calculator: Calculator,
        /// Zero-based row index
        index: usize,
    },
    /// Set one field of one row
    Set {
        /// Calculator id
        calculator: Calculator,
        /// Zero-based row index
        index: usize,
        /// Field name
        field: String,
        /// Numeric value, or "" to clear
        value: String,
    },
    /// Clear back to a single empty row
    Reset {
        /// Calculator id
        calculator: Calculator,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Print one configuration value by dotted key
    Get {
        /// Dotted key, e.g. `billing.period`
        key: String,
    },
    /// Write a default config file
    Init {
        /// Where to write it
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
