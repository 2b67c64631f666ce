//! Validation of a desired deployment set.
//!
//! Conflicts and missing dependencies are expected outcomes and are returned
//! as values. Both checks always run to completion so that the report lists
//! every problem at once.

mod conflicts;
mod dependencies;
mod report;

pub use conflicts::{DeploymentConflict, ResourceConflict, check_conflicts};
pub use dependencies::{
    Candidate, DependencyCheck, MissingDependency, SatisfiedDependency, check_dependencies,
};
pub use report::ValidationReport;
