//! Reconciler for converging the host on the desired deployments.
//!
//! One cycle resolves nothing itself: it takes resolved deployments, checks
//! them as a set, derives the deployment graph, reads the live apps, plans
//! the changes and applies them.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::checker::{SatisfiedDependency, ValidationReport};
use crate::config::DefinitionHasher;
use crate::deployment::ResolvedDeployment;
use crate::error::Result;
use crate::graph::DeploymentGraph;
use crate::planner::{ExecutionMode, ExecutionReport, PlanExecutor, PlanSummary, Planner, ReconciliationPlan};
use crate::runtime::ContainerRuntime;

/// Reconciler for one host.
pub struct Reconciler {
    /// Container runtime of the host.
    runtime: Arc<dyn ContainerRuntime>,
    /// Serial or concurrent application.
    mode: ExecutionMode,
    /// Definition hasher.
    hasher: DefinitionHasher,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// Fingerprint of the applied plan.
    pub fingerprint: String,
    /// Planned changes per kind.
    pub summary: PlanSummary,
    /// What the executor did.
    pub execution: ExecutionReport,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("runtime", &self.runtime.runtime_name())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler.
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, mode: ExecutionMode) -> Self {
        Self {
            runtime,
            mode,
            hasher: DefinitionHasher::new(),
        }
    }

    /// Execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Checks the enabled deployments for conflicts and unmet dependencies.
    #[must_use]
    pub fn check(&self, desired: &[Arc<ResolvedDeployment>]) -> ValidationReport {
        let enabled: Vec<Arc<ResolvedDeployment>> =
            desired.iter().filter(|d| d.is_enabled()).cloned().collect();
        debug!(
            "Checking {} enabled of {} deployments",
            enabled.len(),
            desired.len()
        );
        ValidationReport::validate(&enabled)
    }

    /// Checks the deployments and plans the changes to the host.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the live apps cannot be listed,
    /// or concurrent planning finds dependency cycles.
    pub async fn plan(&self, desired: &[Arc<ResolvedDeployment>]) -> Result<ReconciliationPlan> {
        let report = self.check(desired);
        if !report.is_valid() {
            error!("Deployments failed validation:\n{report}");
        }
        report.ensure_valid()?;
        self.plan_from(desired, &report.satisfied).await
    }

    /// Plans the changes to the host from already-checked dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the live apps cannot be listed, or concurrent
    /// planning finds dependency cycles.
    pub async fn plan_from(
        &self,
        desired: &[Arc<ResolvedDeployment>],
        satisfied: &[SatisfiedDependency],
    ) -> Result<ReconciliationPlan> {
        let enabled: Vec<Arc<ResolvedDeployment>> =
            desired.iter().filter(|d| d.is_enabled()).cloned().collect();
        let graph = DeploymentGraph::build(&enabled, satisfied);

        let live = self.runtime.list_apps().await?;
        debug!("Found {} live apps", live.len());

        let plan = Planner::new(self.mode).plan(desired, &graph, &live)?;
        Ok(plan)
    }

    /// Plans and applies the changes.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails or any change fails.
    pub async fn reconcile(&self, desired: &[Arc<ResolvedDeployment>]) -> Result<ReconciliationResult> {
        let plan = self.plan(desired).await?;
        self.apply(&plan).await
    }

    /// Applies a computed plan.
    ///
    /// # Errors
    ///
    /// Returns an error if any change fails.
    pub async fn apply(&self, plan: &ReconciliationPlan) -> Result<ReconciliationResult> {
        let fingerprint = self.hasher.fingerprint_plan(plan);
        info!(
            "Reconciling plan {} ({})",
            self.hasher.short_hash(&fingerprint),
            plan.summary()
        );

        let execution = PlanExecutor::new(Arc::clone(&self.runtime)).execute(plan).await?;
        info!(
            "Applied {} changes in {} ms",
            execution.applied.len(),
            execution.duration_ms()
        );

        Ok(ReconciliationResult {
            fingerprint,
            summary: plan.summary(),
            execution,
        })
    }
}
