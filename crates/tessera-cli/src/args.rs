//! Command-line argument definitions for the Tessera CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, planner selection and logging verbosity.

use clap::{Parser, ValueEnum};

use tessera::config::PlannerKind;

/// Route planner names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerArg {
    Geometric,
    Topological,
}

impl From<PlannerArg> for PlannerKind {
    fn from(arg: PlannerArg) -> Self {
        match arg {
            PlannerArg::Geometric => PlannerKind::Geometric,
            PlannerArg::Topological => PlannerKind::Topological,
        }
    }
}

/// Command-line arguments for the Tessera layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Tessera file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output JSON file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Route planner, overriding the configuration
    #[arg(long, value_enum)]
    pub planner: Option<PlannerArg>,

    /// Write indented JSON
    #[arg(long)]
    pub pretty: bool,
}
