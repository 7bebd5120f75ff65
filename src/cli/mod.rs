//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CatalogCommand, ExportCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Simulated ETL pipeline runner
#[derive(Debug, Parser, Clone)]
#[command(name = "etl-pipeline")]
#[command(version)]
#[command(about = "Configure and simulate partner ETL pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the simulation for a scenario
    Run(RunCommand),

    /// Validate a scenario file
    Validate(ValidateCommand),

    /// List available features
    Catalog(CatalogCommand),

    /// Export partner configurations
    Export(ExportCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
