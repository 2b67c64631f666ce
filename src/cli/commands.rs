//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::planner::ExecutionMode;

/// Forklift - declarative package deployment for container hosts.
#[derive(Parser, Debug)]
#[command(name = "forklift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the deployment snapshot (YAML or JSON).
    #[arg(short, long, global = true, env = "FORKLIFT_SNAPSHOT", default_value = "snapshot.yaml")]
    pub snapshot: PathBuf,

    /// Path to the settings file (defaults to a discovered forklift.yaml).
    #[arg(short, long, global = true, env = "FORKLIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check deployments for resource conflicts and missing dependencies.
    Check,

    /// Compute and display the reconciliation plan.
    Plan(ApplyArgs),

    /// Apply the plan to the host recorded in the snapshot (dry run).
    Apply(ApplyArgs),
}

/// Execution mode selection shared by `plan` and `apply`.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ApplyArgs {
    /// Apply independent changes concurrently.
    #[arg(long, conflicts_with = "serial")]
    pub parallel: bool,

    /// Apply changes one at a time.
    #[arg(long)]
    pub serial: bool,
}

impl ApplyArgs {
    /// Mode forced on the command line, if any.
    #[must_use]
    pub const fn mode(&self) -> Option<ExecutionMode> {
        if self.serial {
            Some(ExecutionMode::Serial)
        } else if self.parallel {
            Some(ExecutionMode::Concurrent)
        } else {
            None
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_flags() {
        let cli = Cli::try_parse_from(["forklift", "apply", "--serial"]).expect("parse");
        match cli.command {
            Commands::Apply(args) => assert_eq!(args.mode(), Some(ExecutionMode::Serial)),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["forklift", "plan"]).expect("parse");
        match cli.command {
            Commands::Plan(args) => assert_eq!(args.mode(), None),
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["forklift", "plan", "--serial", "--parallel"]).is_err());
    }
}
