//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Simulate the partners of a scenario
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to scenario YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Partners to start (defaults to every partner in the scenario)
    #[arg(short, long)]
    pub partner: Vec<String>,

    /// Wall-clock speed-up factor (1 = real time)
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// Stop after this many ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Print stage reports when the run ends
    #[arg(long)]
    pub report: bool,

    /// Write partner configurations and stage reports to this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

/// Validate a scenario and check every partner is ready to run
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to scenario YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List the feature catalog
#[derive(Debug, Args, Clone)]
pub struct CatalogCommand {
    /// Catalog YAML file (defaults to the built-in catalog)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Export partner configurations as JSON
#[derive(Debug, Args, Clone)]
pub struct ExportCommand {
    /// Path to scenario YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Partner to export (defaults to every partner)
    #[arg(short, long)]
    pub partner: Option<String>,

    /// Output directory; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
