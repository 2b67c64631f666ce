//! Error types for the forklift reconciliation engine.
//!
//! This module provides the error hierarchy for every stage of a reconciliation
//! cycle: configuration, deployment resolution, validation, planning,
//! execution, and the container-runtime collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for forklift.
#[derive(Debug, Error)]
pub enum ForkliftError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Deployment resolution errors.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Validation errors (conflicts, missing dependencies).
    #[error("Validation error: {0}")]
    Check(#[from] CheckError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// Reconciliation (execution) errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Container runtime errors.
    #[error("Container runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration or snapshot file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The file could not be parsed.
    #[error("Failed to parse {location}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Source location.
        location: String,
    },

    /// An environment override had an unusable value.
    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar {
        /// Name of the variable.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Errors raised while resolving deployments against their packages.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The deployment references a package no source provides.
    #[error("Deployment '{deployment}' references unknown package '{package}'")]
    PackageNotFound {
        /// Deployment name.
        deployment: String,
        /// Package path.
        package: String,
    },

    /// The deployment enables a feature its package does not declare.
    #[error("Deployment '{deployment}' enables unknown feature '{feature}' of package '{package}'")]
    FeatureNotFound {
        /// Deployment name.
        deployment: String,
        /// Package path.
        package: String,
        /// Feature name.
        feature: String,
    },

    /// Two deployments share the same name.
    #[error("Duplicate deployment name: {name}")]
    DuplicateDeployment {
        /// The duplicated name.
        name: String,
    },
}

/// Validation failures. The detailed report is printed before this is returned.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Conflicts and/or missing dependencies were found.
    #[error("{conflicts} deployment conflict(s) and {missing} missing dependency(ies)")]
    Failed {
        /// Number of conflicting deployment pairs.
        conflicts: usize,
        /// Number of missing dependencies.
        missing: usize,
    },
}

/// Planning errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The change graph contains cycles, so concurrent application is unsafe.
    #[error("Dependency cycles prevent concurrent application (retry serially): {}", format_cycles(.cycles))]
    DependencyCycles {
        /// Each cycle as its sorted member names.
        cycles: Vec<Vec<String>>,
    },

    /// A change references a node the graph does not know about.
    #[error("Change graph references unknown change '{name}'")]
    UnknownChange {
        /// Name of the change.
        name: String,
    },
}

/// Reconciliation (execution) errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A single change failed.
    #[error("Failed to {kind} app '{app}': {source}")]
    ChangeFailed {
        /// Change kind (add, update, remove).
        kind: String,
        /// App name.
        app: String,
        /// Underlying runtime error.
        source: RuntimeError,
    },

    /// One or more changes failed during concurrent application.
    #[error("{} of {total} changes failed: {}", .failures.len(), .failures.join("; "))]
    ChangesFailed {
        /// Total number of changes in the plan.
        total: usize,
        /// Messages of the failed changes.
        failures: Vec<String>,
    },

    /// A concurrent task did not run to completion.
    #[error("Task for '{app}' did not complete: {message}")]
    TaskAborted {
        /// App name.
        app: String,
        /// Description of the join failure.
        message: String,
    },
}

/// Errors reported by the container-runtime collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// The app does not exist on the host.
    #[error("App not found: {app}")]
    AppNotFound {
        /// App name.
        app: String,
    },

    /// Deploying the app failed.
    #[error("Failed to deploy {app}: {message}")]
    DeployFailed {
        /// App name.
        app: String,
        /// Description of the failure.
        message: String,
    },

    /// Removing the app failed.
    #[error("Failed to remove {app}: {message}")]
    RemoveFailed {
        /// App name.
        app: String,
        /// Description of the failure.
        message: String,
    },

    /// The runtime could not be reached.
    #[error("Container runtime unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for forklift operations.
pub type Result<T> = std::result::Result<T, ForkliftError>;

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| format!("[{}]", cycle.join(", ")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ForkliftError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error reports a validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Check(_))
    }
}

impl ConfigError {
    /// Creates a parse error for a given source location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: location.into(),
        }
    }
}

impl RuntimeError {
    /// Creates a deploy failure.
    #[must_use]
    pub fn deploy_failed(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeployFailed {
            app: app.into(),
            message: message.into(),
        }
    }

    /// Creates a remove failure.
    #[must_use]
    pub fn remove_failed(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoveFailed {
            app: app.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_names_members() {
        let err = PlanError::DependencyCycles {
            cycles: vec![vec!["a".into(), "b".into(), "c".into()]],
        };
        let message = err.to_string();
        assert!(message.contains("[a, b, c]"));
        assert!(message.contains("retry serially"));
    }

    #[test]
    fn test_change_failed_carries_identity() {
        let err = ReconcileError::ChangeFailed {
            kind: "add".into(),
            app: "web".into(),
            source: RuntimeError::deploy_failed("web", "image missing"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to add app 'web': Failed to deploy web: image missing"
        );
    }

    #[test]
    fn test_is_validation() {
        let err = ForkliftError::from(CheckError::Failed {
            conflicts: 1,
            missing: 0,
        });
        assert!(err.is_validation());
        assert!(!ForkliftError::internal("boom").is_validation());
    }
}
