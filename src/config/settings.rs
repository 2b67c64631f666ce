//! Engine settings, mapped from `forklift.yaml`.

use serde::{Deserialize, Serialize};

use crate::planner::ExecutionMode;

/// The root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForkliftConfig {
    /// How plans are applied.
    pub apply: ApplyConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Plan application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApplyConfig {
    /// Apply independent changes concurrently.
    pub parallel: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ApplyConfig {
    /// Execution mode selected by these settings.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        if self.parallel {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Serial
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. `info`, `forklift=debug`).
    pub level: String,
    /// Emit JSON log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
        }
    }
}
