//! Plan executor for applying reconciliation plans.
//!
//! Serial plans run one change at a time and stop at the first failure.
//! Concurrent plans run one task per change; a task waits on the completion
//! signals of its prerequisites, applies its change, then signals its own
//! completion whether or not the change succeeded. There is no rollback.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{PlanError, ReconcileError, Result, RuntimeError};
use crate::runtime::ContainerRuntime;

use super::change::{ChangeKind, ReconciliationChange};
use super::plan::{ExecutionMode, ReconciliationPlan};

/// A change that was applied successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    /// App name.
    pub name: String,
    /// Kind of change.
    pub kind: ChangeKind,
}

/// Result of applying a plan.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Mode the plan was applied in.
    pub mode: ExecutionMode,
    /// Applied changes, in completion order.
    pub applied: Vec<AppliedChange>,
    /// When execution started.
    pub started_at: DateTime<Utc>,
    /// When execution finished.
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    /// Number of applied changes of the given kind.
    #[must_use]
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.applied.iter().filter(|c| c.kind == kind).count()
    }

    /// Position of an app in completion order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.applied.iter().position(|c| c.name == name)
    }

    /// Wall-clock execution time in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Executor for reconciliation plans.
pub struct PlanExecutor {
    runtime: Arc<dyn ContainerRuntime>,
}

impl std::fmt::Debug for PlanExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanExecutor")
            .field("runtime", &self.runtime.runtime_name())
            .finish()
    }
}

impl PlanExecutor {
    /// Creates a new plan executor.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Applies a plan in the mode it was computed for.
    ///
    /// # Errors
    ///
    /// In serial mode, returns the first failed change. In concurrent mode,
    /// returns every failure once all changes have finished.
    pub async fn execute(&self, plan: &ReconciliationPlan) -> Result<ExecutionReport> {
        info!(
            "Applying {} changes ({} mode) via {} runtime",
            plan.changes().len(),
            plan.mode(),
            self.runtime.runtime_name()
        );
        let started_at = Utc::now();

        let applied = match plan.mode() {
            ExecutionMode::Serial => self.execute_serial(plan).await?,
            ExecutionMode::Concurrent => self.execute_concurrent(plan).await?,
        };

        Ok(ExecutionReport {
            mode: plan.mode(),
            applied,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn execute_serial(&self, plan: &ReconciliationPlan) -> Result<Vec<AppliedChange>> {
        let mut applied = Vec::with_capacity(plan.changes().len());
        for name in plan.serial_order() {
            let change = plan
                .change(&name)
                .ok_or_else(|| PlanError::UnknownChange { name: name.clone() })?;
            apply_change(self.runtime.as_ref(), change).await?;
            applied.push(AppliedChange {
                name,
                kind: change.kind,
            });
        }
        Ok(applied)
    }

    async fn execute_concurrent(&self, plan: &ReconciliationPlan) -> Result<Vec<AppliedChange>> {
        let total = plan.changes().len();
        let mut senders = BTreeMap::new();
        let mut receivers = BTreeMap::new();
        for name in plan.changes().keys() {
            let (tx, rx) = watch::channel(false);
            senders.insert(name.clone(), tx);
            receivers.insert(name.clone(), rx);
        }

        let mut tasks = JoinSet::new();
        for (name, change) in plan.changes() {
            let waits = plan
                .prerequisites(name)
                .map(|prerequisite| {
                    receivers
                        .get(prerequisite)
                        .cloned()
                        .map(|rx| (prerequisite.clone(), rx))
                        .ok_or_else(|| PlanError::UnknownChange {
                            name: prerequisite.clone(),
                        })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let done = senders
                .remove(name)
                .ok_or_else(|| PlanError::UnknownChange { name: name.clone() })?;
            let runtime = Arc::clone(&self.runtime);
            let change = change.clone();

            tasks.spawn(async move {
                for (prerequisite, mut rx) in waits {
                    // A dropped sender also means the prerequisite is over
                    if rx.wait_for(|finished| *finished).await.is_err() {
                        debug!("Prerequisite {prerequisite} of {} ended without signal", change.name);
                    }
                }

                let result = apply_change(runtime.as_ref(), &change).await;
                done.send_replace(true);

                if let Err(e) = &result {
                    error!("{e}");
                }
                (change.name, change.kind, result)
            });
        }
        drop(receivers);

        let mut applied = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, kind, Ok(()))) => applied.push(AppliedChange { name, kind }),
                Ok((_, _, Err(e))) => failures.push(e.to_string()),
                Err(e) => failures.push(format!("change task failed: {e}")),
            }
        }

        if failures.is_empty() {
            Ok(applied)
        } else {
            failures.sort();
            Err(ReconcileError::ChangesFailed { total, failures }.into())
        }
    }
}

/// Applies one change. Add and Update deploy, Remove tears down; removing an
/// app that is already gone succeeds.
async fn apply_change(
    runtime: &dyn ContainerRuntime,
    change: &ReconciliationChange,
) -> std::result::Result<(), ReconcileError> {
    info!("Applying change: {}", change.describe());

    let result = match (change.kind, change.deployment.as_deref()) {
        (ChangeKind::Remove, _) => match runtime.remove_app(&change.name).await {
            Err(RuntimeError::AppNotFound { .. }) => {
                info!("App {} was already removed", change.name);
                Ok(())
            }
            other => other,
        },
        (_, Some(deployment)) => runtime.deploy_app(&change.name, deployment).await,
        (_, None) => Err(RuntimeError::deploy_failed(
            &change.name,
            "change has no deployment",
        )),
    };

    result.map_err(|source| ReconcileError::ChangeFailed {
        kind: change.kind.to_string(),
        app: change.name.clone(),
        source,
    })
}
