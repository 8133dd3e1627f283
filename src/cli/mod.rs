use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "landflow")]
#[command(about = "Operator tooling for the renewable-energy land workflow engine")]
#[command(long_about = "Landflow drives lands from draft through section review, publication \
                       and investor interest to ready-to-build. These commands inspect the \
                       reference data, the effective configuration and the land store.")]
pub struct Cli {
    /// Read configuration from this TOML file instead of the default locations
    #[arg(long, global = true, help = "Configuration file (defaults to landflow.toml / .landflow-rc)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print roles, energy types and section definitions
    Catalog {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: commands::OutputFormat,
    },
    /// Print the effective configuration, or write it to a file
    Config {
        /// Write the configuration here instead of printing it
        #[arg(long, help = "Write the effective configuration to this path")]
        write: Option<PathBuf>,
    },
    /// Create the database, run migrations and seed the catalog
    #[cfg(feature = "database")]
    Migrate,
    /// Show a land with its sections, tasks and interests
    #[cfg(feature = "database")]
    Inspect {
        /// Land id (UUID)
        land_id: String,
        /// Also print the committed event trail
        #[arg(long, help = "Include the event history")]
        events: bool,
    },
}
