//! Combined validation report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::deployment::ResolvedDeployment;
use crate::error::CheckError;

use super::conflicts::{DeploymentConflict, check_conflicts};
use super::dependencies::{MissingDependency, SatisfiedDependency, check_dependencies};

/// Conflicts and dependency results for a desired deployment set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Conflicting deployment pairs.
    pub conflicts: Vec<DeploymentConflict>,
    /// Satisfied requirements.
    pub satisfied: Vec<SatisfiedDependency>,
    /// Unsatisfied requirements.
    pub missing: Vec<MissingDependency>,
}

impl ValidationReport {
    /// Runs both checks over the deployment set. Neither short-circuits.
    #[must_use]
    pub fn validate(deployments: &[Arc<ResolvedDeployment>]) -> Self {
        let conflicts = check_conflicts(deployments);
        let dependencies = check_dependencies(deployments);

        let report = Self {
            conflicts,
            satisfied: dependencies.satisfied,
            missing: dependencies.missing,
        };

        if report.is_valid() {
            info!(
                "Validated {} deployments: {} dependencies satisfied",
                deployments.len(),
                report.satisfied.len()
            );
        } else {
            warn!(
                "Validation found {} conflicts and {} missing dependencies",
                report.conflicts.len(),
                report.missing.len()
            );
        }
        report
    }

    /// Returns true if there are no conflicts and no missing dependencies.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty() && self.missing.is_empty()
    }

    /// Missing dependencies grouped by requiring deployment.
    #[must_use]
    pub fn missing_by_deployment(&self) -> BTreeMap<&str, Vec<&MissingDependency>> {
        let mut grouped: BTreeMap<&str, Vec<&MissingDependency>> = BTreeMap::new();
        for missing in &self.missing {
            grouped.entry(missing.deployment.as_str()).or_default().push(missing);
        }
        grouped
    }

    /// Converts the report into an error if validation failed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Failed`] when there are conflicts or missing
    /// dependencies.
    pub fn ensure_valid(&self) -> Result<(), CheckError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(CheckError::Failed {
            conflicts: self.conflicts.len(),
            missing: self.missing.len(),
        })
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            return write!(f, "No conflicts or missing dependencies");
        }

        for conflict in &self.conflicts {
            writeln!(f, "Deployment {} conflicts with {}:", conflict.first, conflict.second)?;
            if let Some(app) = &conflict.app_name {
                writeln!(f, "  conflicting app name {app}")?;
            }
            for resource in &conflict.resources {
                writeln!(f, "  {} ({})", resource.first.resource.kind(), resource.reasons.join(", "))?;
                writeln!(f, "    provided by {}", resource.first.source())?;
                writeln!(f, "    and by {}", resource.second.source())?;
            }
        }

        for (deployment, missing) in self.missing_by_deployment() {
            writeln!(f, "Deployment {deployment} is missing dependencies:")?;
            for dependency in missing {
                writeln!(f, "  {}", dependency.required)?;
                if dependency.best_candidates.is_empty() {
                    writeln!(f, "    no candidates provide a {}", dependency.required.resource.kind())?;
                }
                for candidate in &dependency.best_candidates {
                    writeln!(
                        f,
                        "    closest: {} ({})",
                        candidate.provided,
                        candidate.reasons.join(", ")
                    )?;
                }
            }
        }
        Ok(())
    }
}
