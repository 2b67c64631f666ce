//! CLI module for forklift.
//!
//! This module provides the command-line interface for checking, planning
//! and applying deployment snapshots.

mod commands;
mod output;

pub use commands::{ApplyArgs, Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
