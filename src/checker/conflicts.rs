//! Pairwise conflict detection between deployments.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::deployment::ResolvedDeployment;
use crate::resources::{
    AttachedResource, FileExportResource, FilesetResource, ListenerResource, NetworkResource,
    Resource, ResourceSpec, ServiceResource,
};

/// Two provided resources of the same kind that cannot coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceConflict {
    /// Resource from the first deployment.
    pub first: AttachedResource<Resource>,
    /// Resource from the second deployment.
    pub second: AttachedResource<Resource>,
    /// Why they conflict.
    pub reasons: Vec<String>,
}

/// Everything that prevents two deployments from coexisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentConflict {
    /// Name of the first deployment (lexicographically smaller).
    pub first: String,
    /// Name of the second deployment.
    pub second: String,
    /// The shared app name, if both deployments map to the same app.
    pub app_name: Option<String>,
    /// Conflicting resource pairs.
    pub resources: Vec<ResourceConflict>,
}

impl DeploymentConflict {
    /// Returns true if anything conflicts.
    #[must_use]
    pub fn has_conflict(&self) -> bool {
        self.app_name.is_some() || !self.resources.is_empty()
    }
}

fn check_kind<R: ResourceSpec>(
    first: &ResolvedDeployment,
    second: &ResolvedDeployment,
    conflicts: &mut Vec<ResourceConflict>,
) {
    for a in R::select_provided(first.provided()) {
        for b in R::select_provided(second.provided()) {
            let reasons = a.resource.conflicts_with(&b.resource);
            if !reasons.is_empty() {
                conflicts.push(ResourceConflict {
                    first: a.erase(),
                    second: b.erase(),
                    reasons,
                });
            }
        }
    }
}

fn check_pair(first: &ResolvedDeployment, second: &ResolvedDeployment) -> DeploymentConflict {
    let app_name = (first.app_name() == second.app_name()).then(|| first.app_name());

    let mut resources = Vec::new();
    check_kind::<ListenerResource>(first, second, &mut resources);
    check_kind::<NetworkResource>(first, second, &mut resources);
    check_kind::<ServiceResource>(first, second, &mut resources);
    check_kind::<FilesetResource>(first, second, &mut resources);
    check_kind::<FileExportResource>(first, second, &mut resources);

    DeploymentConflict {
        first: first.name().to_string(),
        second: second.name().to_string(),
        app_name,
        resources,
    }
}

/// Checks every unordered pair of deployments for conflicts.
///
/// Resources are never compared within a single deployment.
#[must_use]
pub fn check_conflicts(deployments: &[Arc<ResolvedDeployment>]) -> Vec<DeploymentConflict> {
    let mut sorted: Vec<&ResolvedDeployment> = deployments.iter().map(|d| &**d).collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let mut conflicts = Vec::new();
    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            let conflict = check_pair(first, second);
            if conflict.has_conflict() {
                debug!(
                    "Deployments {} and {} conflict ({} resources)",
                    conflict.first,
                    conflict.second,
                    conflict.resources.len()
                );
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{Deployment, PackageSpec};
    use crate::resources::Transport;

    fn deployment_with(name: &str, listeners: &[u16]) -> Arc<ResolvedDeployment> {
        let mut package = PackageSpec::new(format!("pkg/{name}"));
        package.deployment.definition_files = vec![String::from("compose.yml")];
        package.deployment.provides.listeners = listeners
            .iter()
            .map(|port| ListenerResource::new(*port, Transport::Tcp))
            .collect();
        let deployment = Deployment::new(name, &package.path);
        Arc::new(ResolvedDeployment::new(deployment, Arc::new(package)).expect("resolve"))
    }

    #[test]
    fn test_colliding_listeners_conflict() {
        let deployments = vec![deployment_with("a", &[80]), deployment_with("b", &[80, 443])];
        let conflicts = check_conflicts(&deployments);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].first, "a");
        assert_eq!(conflicts[0].second, "b");
        assert_eq!(conflicts[0].resources.len(), 1);
        assert!(conflicts[0].app_name.is_none());
    }

    #[test]
    fn test_no_self_conflict() {
        let deployments = vec![deployment_with("a", &[80, 80])];
        assert!(check_conflicts(&deployments).is_empty());
    }

    #[test]
    fn test_conflict_found_among_many() {
        let mut deployments: Vec<_> = (0..10u16)
            .map(|i| deployment_with(&format!("d{i}"), &[1000 + i]))
            .collect();
        deployments.push(deployment_with("zz", &[1005]));
        let conflicts = check_conflicts(&deployments);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].first, "d5");
        assert_eq!(conflicts[0].second, "zz");
    }

    #[test]
    fn test_app_name_collision() {
        let deployments = vec![deployment_with("infra/web", &[]), deployment_with("infra_web", &[])];
        let conflicts = check_conflicts(&deployments);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].app_name.as_deref(), Some("infra_web"));
        assert!(conflicts[0].resources.is_empty());
    }
}
