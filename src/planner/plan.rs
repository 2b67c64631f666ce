//! Reconciliation plans.
//!
//! A plan holds the changes for one cycle and the graph of which changes
//! must complete before which. Every removal precedes every other change,
//! and deployment dependencies order the rest. The graph is pruned of edges
//! implied by longer paths before execution.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::deployment::ResolvedDeployment;
use crate::error::PlanError;
use crate::graph::{DeploymentGraph, Digraph};
use crate::runtime::LiveApp;

use super::change::{ChangeKind, ReconciliationChange};
use super::diff::classify_changes;

/// How a plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One change at a time, in a total order.
    Serial,
    /// Every change as soon as its prerequisites are done.
    Concurrent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Number of changes per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Additions.
    pub adds: usize,
    /// Updates.
    pub updates: usize,
    /// Removals.
    pub removes: usize,
}

impl PlanSummary {
    /// Total number of changes.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.adds + self.updates + self.removes
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to add, {} to update, {} to remove",
            self.adds, self.updates, self.removes
        )
    }
}

/// The changes of one reconciliation cycle and their ordering.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationPlan {
    mode: ExecutionMode,
    created_at: DateTime<Utc>,
    changes: BTreeMap<String, ReconciliationChange>,
    /// Change name to the changes that must complete first, pruned.
    graph: Digraph<String>,
    /// Total order, computed in serial mode.
    order: Option<Vec<String>>,
    cycles: Vec<Vec<String>>,
}

impl ReconciliationPlan {
    /// Execution mode the plan was computed for.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// When the plan was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Changes keyed by app name.
    #[must_use]
    pub const fn changes(&self) -> &BTreeMap<String, ReconciliationChange> {
        &self.changes
    }

    /// Looks up a change by app name.
    #[must_use]
    pub fn change(&self, name: &str) -> Option<&ReconciliationChange> {
        self.changes.get(name)
    }

    /// Pruned change graph.
    #[must_use]
    pub const fn graph(&self) -> &Digraph<String> {
        &self.graph
    }

    /// Changes that must complete before `name`.
    pub fn prerequisites(&self, name: &str) -> impl Iterator<Item = &String> {
        self.graph
            .dependencies(&name.to_string())
            .into_iter()
            .flatten()
    }

    /// Total order, present for serial plans.
    #[must_use]
    pub fn order(&self) -> Option<&[String]> {
        self.order.as_deref()
    }

    /// The serial order, derived from the graph if the plan has none.
    #[must_use]
    pub fn serial_order(&self) -> Vec<String> {
        self.order
            .clone()
            .unwrap_or_else(|| serialize(&self.graph))
    }

    /// Changes grouped by dependency cycle. Only serial plans can have any.
    #[must_use]
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Counts changes per kind.
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in self.changes.values() {
            match change.kind {
                ChangeKind::Add => summary.adds += 1,
                ChangeKind::Update => summary.updates += 1,
                ChangeKind::Remove => summary.removes += 1,
            }
        }
        summary
    }
}

/// Builds reconciliation plans.
#[derive(Debug, Clone, Copy)]
pub struct Planner {
    mode: ExecutionMode,
}

impl Planner {
    /// Creates a planner for the given execution mode.
    #[must_use]
    pub const fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    /// Plans the changes from `live` to `desired`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DependencyCycles`] when planning for concurrent
    /// execution and the change graph has cycles.
    pub fn plan(
        &self,
        desired: &[Arc<ResolvedDeployment>],
        deps: &DeploymentGraph,
        live: &[LiveApp],
    ) -> Result<ReconciliationPlan, PlanError> {
        let changes = classify_changes(desired, live);
        let graph = build_change_graph(&changes, deps);

        let cycles = graph.cycles();
        if !cycles.is_empty() {
            if self.mode == ExecutionMode::Concurrent {
                return Err(PlanError::DependencyCycles { cycles });
            }
            warn!(
                "Change graph has {} cycle(s); ordering within them is best-effort",
                cycles.len()
            );
        }

        let order = (self.mode == ExecutionMode::Serial).then(|| serialize(&graph));
        let pruned = graph.transitive_reduction();
        debug!(
            "Pruned change graph from {} to {} edges",
            graph.edge_count(),
            pruned.edge_count()
        );

        let plan = ReconciliationPlan {
            mode: self.mode,
            created_at: Utc::now(),
            changes,
            graph: pruned,
            order,
            cycles,
        };
        info!("Planned {} ({} mode)", plan.summary(), self.mode);
        Ok(plan)
    }
}

/// Removals precede every other change. Among the rest, deployment
/// dependencies are copied when both ends have a change, transitively, so
/// ordering survives deployments that produce no change.
fn build_change_graph(
    changes: &BTreeMap<String, ReconciliationChange>,
    deps: &DeploymentGraph,
) -> Digraph<String> {
    let mut graph = Digraph::new();
    for name in changes.keys() {
        graph.add_node(name.clone());
    }

    let removals: Vec<&String> = changes
        .iter()
        .filter(|(_, change)| change.is_remove())
        .map(|(name, _)| name)
        .collect();

    let mut apps_by_deployment: BTreeMap<&str, &String> = BTreeMap::new();
    for (name, change) in changes {
        if change.is_remove() {
            continue;
        }
        for removal in &removals {
            graph.add_edge(name.clone(), (*removal).clone());
        }
        if let Some(deployment) = change.deployment_name() {
            apps_by_deployment.insert(deployment, name);
        }
    }

    for (consumer, providers) in deps.closure().iter() {
        let Some(&consumer_app) = apps_by_deployment.get(consumer.as_str()) else {
            continue;
        };
        for provider in providers {
            if provider == consumer {
                continue;
            }
            if let Some(&provider_app) = apps_by_deployment.get(provider.as_str()) {
                graph.add_edge(consumer_app.clone(), provider_app.clone());
            }
        }
    }

    graph
}

/// Total order in which every change follows its dependencies. Among ready
/// changes, those with more transitive dependents go first, then those with
/// more transitive dependencies, then by name. When only cycle members
/// remain, the best of them by the same key goes next.
fn serialize(graph: &Digraph<String>) -> Vec<String> {
    let closure = graph.transitive_closure();
    let dependents = closure.invert();
    let count = |g: &Digraph<String>, node: &String| {
        g.dependencies(node)
            .map_or(0, |others| others.iter().filter(|o| *o != node).count())
    };
    let key = |node: &String| {
        (
            Reverse(count(&dependents, node)),
            Reverse(count(&closure, node)),
            node.clone(),
        )
    };

    let mut remaining: BTreeSet<&String> = graph.nodes().collect();
    let mut emitted: BTreeSet<&String> = BTreeSet::new();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let is_ready = |node: &String| {
            graph
                .dependencies(node)
                .into_iter()
                .flatten()
                .all(|dep| dep == node || emitted.contains(dep))
        };
        let next = remaining
            .iter()
            .copied()
            .filter(|node| is_ready(node))
            .min_by_key(|node| key(node))
            .or_else(|| remaining.iter().copied().min_by_key(|node| key(node)));
        let Some(next) = next else {
            break;
        };
        remaining.remove(next);
        emitted.insert(next);
        order.push(next.clone());
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::check_dependencies;
    use crate::deployment::{Deployment, PackageSpec};
    use crate::resources::{NetworkResource, ProvidedResources, RequiredResources};

    /// A deployable deployment that provides `net-{name}` and requires
    /// `net-{r}` for each of `requires`.
    fn node(name: &str, requires: &[&str]) -> Arc<ResolvedDeployment> {
        let mut package = PackageSpec::new(format!("pkg/{name}"));
        package.deployment.definition_files = vec![String::from("compose.yml")];
        package.deployment.provides = ProvidedResources {
            networks: vec![NetworkResource::new(format!("net-{name}"))],
            ..Default::default()
        };
        package.deployment.requires = RequiredResources {
            networks: requires
                .iter()
                .map(|r| NetworkResource::new(format!("net-{r}")))
                .collect(),
            ..Default::default()
        };
        Arc::new(
            ResolvedDeployment::new(Deployment::new(name, &package.path), Arc::new(package))
                .expect("resolve"),
        )
    }

    fn plan(
        mode: ExecutionMode,
        desired: &[Arc<ResolvedDeployment>],
        live: &[LiveApp],
    ) -> Result<ReconciliationPlan, PlanError> {
        let check = check_dependencies(desired);
        assert!(check.missing.is_empty(), "unexpected missing dependencies");
        let deps = DeploymentGraph::build(desired, &check.satisfied);
        Planner::new(mode).plan(desired, &deps, live)
    }

    fn position(order: &[String], name: &str) -> usize {
        order
            .iter()
            .position(|n| n == name)
            .expect("change in order")
    }

    #[test]
    fn test_chain_is_ordered_and_pruned() {
        let desired = vec![node("a", &["b"]), node("b", &["c"]), node("c", &[])];
        let plan = plan(ExecutionMode::Serial, &desired, &[]).expect("plan");

        assert_eq!(plan.order(), Some(&["c".to_string(), "b".into(), "a".into()][..]));
        // a -> c is implied by a -> b -> c
        assert!(!plan.graph().has_edge(&"a".into(), &"c".into()));
        assert!(plan.graph().has_edge(&"a".into(), &"b".into()));
        assert_eq!(plan.summary().adds, 3);
    }

    #[test]
    fn test_ordering_survives_metadata_only_deployment() {
        // m has no app definition, so it produces no change
        let mut package = PackageSpec::new("pkg/m");
        package.deployment.provides = ProvidedResources {
            networks: vec![NetworkResource::new("net-m")],
            ..Default::default()
        };
        package.deployment.requires = RequiredResources {
            networks: vec![NetworkResource::new("net-c")],
            ..Default::default()
        };
        let metadata_only = Arc::new(
            ResolvedDeployment::new(Deployment::new("m", "pkg/m"), Arc::new(package))
                .expect("resolve"),
        );
        assert!(!metadata_only.is_deployable());

        let desired = vec![node("a", &["m"]), metadata_only, node("c", &[])];
        let plan = plan(ExecutionMode::Serial, &desired, &[]).expect("plan");

        assert!(plan.change("m").is_none());
        assert_eq!(plan.order(), Some(&["c".to_string(), "a".into()][..]));
        assert!(plan.graph().has_edge(&"a".into(), &"c".into()));
    }

    #[test]
    fn test_removals_precede_everything_else() {
        let desired = vec![node("a", &[]), node("b", &[])];
        let live = vec![LiveApp::new("b"), LiveApp::new("gone"), LiveApp::new("old")];
        let plan = plan(ExecutionMode::Serial, &desired, &live).expect("plan");

        let order = plan.order().expect("serial order");
        for removal in ["gone", "old"] {
            for other in ["a", "b"] {
                assert!(position(order, removal) < position(order, other));
                assert!(plan.graph().has_edge(&other.to_string(), &removal.to_string()));
            }
        }
        assert_eq!(plan.summary(), PlanSummary { adds: 1, updates: 1, removes: 2 });
    }

    #[test]
    fn test_cycles_fail_concurrent_planning() {
        let desired = vec![node("a", &["b"]), node("b", &["c"]), node("c", &["a"])];

        let err = plan(ExecutionMode::Concurrent, &desired, &[]).expect_err("cycle");
        match &err {
            PlanError::DependencyCycles { cycles } => {
                assert_eq!(cycles, &vec![vec!["a".to_string(), "b".into(), "c".into()]]);
            }
            PlanError::UnknownChange { .. } => panic!("unexpected error: {err}"),
        }
        let message = err.to_string();
        for name in ["a", "b", "c"] {
            assert!(message.contains(name));
        }

        let serial = plan(ExecutionMode::Serial, &desired, &[]).expect("serial plan");
        let mut order = serial.order().expect("order").to_vec();
        order.sort();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(serial.cycles().len(), 1);
    }

    #[test]
    fn test_tie_breaking_prefers_more_dependents() {
        // x and y are both ready; y has two dependents, x has none
        let desired = vec![
            node("x", &[]),
            node("y", &[]),
            node("p", &["y"]),
            node("q", &["y"]),
        ];
        let plan = plan(ExecutionMode::Serial, &desired, &[]).expect("plan");
        assert_eq!(plan.order().expect("order")[0], "y");
    }

    #[test]
    fn test_concurrent_plan_has_no_order() {
        let desired = vec![node("a", &["b"]), node("b", &[])];
        let plan = plan(ExecutionMode::Concurrent, &desired, &[]).expect("plan");
        assert!(plan.order().is_none());
        assert_eq!(plan.serial_order(), vec!["b", "a"]);
    }

    #[test]
    fn test_empty_plan() {
        let plan = plan(ExecutionMode::Concurrent, &[], &[]).expect("plan");
        assert!(plan.is_empty());
        assert_eq!(plan.summary().total(), 0);
    }
}
