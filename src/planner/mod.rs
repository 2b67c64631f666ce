//! Planning module for reconciliation.
//!
//! This module compares the desired deployments with the apps live on the
//! host, orders the resulting changes, and applies them.

mod change;
mod diff;
mod executor;
mod plan;

pub use change::{ChangeKind, ReconciliationChange};
pub use diff::classify_changes;
pub use executor::{AppliedChange, ExecutionReport, PlanExecutor};
pub use plan::{ExecutionMode, PlanSummary, Planner, ReconciliationPlan};
