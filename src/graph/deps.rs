//! Deployment-level dependency graph.

use std::sync::Arc;
use tracing::debug;

use crate::checker::SatisfiedDependency;
use crate::deployment::ResolvedDeployment;

use super::digraph::Digraph;

/// Ordering constraints between deployments, derived from satisfied
/// dependencies. An edge `consumer -> provider` means the provider must be
/// applied first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentGraph {
    direct: Digraph<String>,
    closure: Digraph<String>,
}

impl DeploymentGraph {
    /// Builds the graph. Self-satisfied and nonblocking requirements add no
    /// edge; every deployment appears as a node.
    #[must_use]
    pub fn build(deployments: &[Arc<ResolvedDeployment>], satisfied: &[SatisfiedDependency]) -> Self {
        let mut direct = Digraph::new();
        for deployment in deployments {
            direct.add_node(deployment.name().to_string());
        }

        for dependency in satisfied {
            if dependency.is_self_satisfied() || !dependency.is_blocking() {
                continue;
            }
            direct.add_edge(
                dependency.deployment.clone(),
                dependency.provider_deployment.clone(),
            );
        }

        let closure = direct.transitive_closure();
        debug!(
            "Deployment graph: {} nodes, {} edges ({} transitive)",
            direct.len(),
            direct.edge_count(),
            closure.edge_count()
        );
        Self { direct, closure }
    }

    /// Direct dependencies.
    #[must_use]
    pub const fn direct(&self) -> &Digraph<String> {
        &self.direct
    }

    /// Transitive dependencies.
    #[must_use]
    pub const fn closure(&self) -> &Digraph<String> {
        &self.closure
    }

    /// Returns true if `consumer` transitively depends on `provider`.
    #[must_use]
    pub fn depends_on(&self, consumer: &str, provider: &str) -> bool {
        self.closure
            .has_edge(&consumer.to_string(), &provider.to_string())
    }

    /// Deployments that transitively depend on themselves.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        self.direct.cycles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::check_dependencies;
    use crate::deployment::{Deployment, PackageSpec};
    use crate::resources::{
        FilesetResource, ProvidedResources, Protocol, RequiredResources, ServiceResource,
    };

    fn resolved(name: &str, provides: ProvidedResources, requires: RequiredResources) -> Arc<ResolvedDeployment> {
        let mut package = PackageSpec::new(format!("pkg/{name}"));
        package.deployment.definition_files = vec![String::from("compose.yml")];
        package.deployment.provides = provides;
        package.deployment.requires = requires;
        Arc::new(
            ResolvedDeployment::new(Deployment::new(name, &package.path), Arc::new(package))
                .expect("resolve"),
        )
    }

    #[test]
    fn test_self_dependency_excluded() {
        let service = ServiceResource::new(80, Protocol::Http);
        let deployments = vec![resolved(
            "x",
            ProvidedResources {
                services: vec![service.clone()],
                ..Default::default()
            },
            RequiredResources {
                services: vec![service],
                ..Default::default()
            },
        )];
        let check = check_dependencies(&deployments);
        let graph = DeploymentGraph::build(&deployments, &check.satisfied);
        assert_eq!(check.satisfied.len(), 1);
        assert!(!graph.direct().has_edge(&"x".to_string(), &"x".to_string()));
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn test_nonblocking_excluded_but_satisfied() {
        let provider = resolved(
            "files",
            ProvidedResources {
                filesets: vec![FilesetResource::new(&["/srv/*"])],
                ..Default::default()
            },
            RequiredResources::default(),
        );
        let mut required = FilesetResource::new(&["/srv/data"]);
        required.nonblocking = true;
        let consumer = resolved(
            "app",
            ProvidedResources::default(),
            RequiredResources {
                filesets: vec![required],
                ..Default::default()
            },
        );
        let deployments = vec![provider, consumer];
        let check = check_dependencies(&deployments);
        assert!(check.missing.is_empty());
        assert_eq!(check.satisfied.len(), 1);

        let graph = DeploymentGraph::build(&deployments, &check.satisfied);
        assert!(!graph.depends_on("app", "files"));
        assert_eq!(graph.direct().edge_count(), 0);
    }

    #[test]
    fn test_blocking_edge_and_closure() {
        let http = ServiceResource::new(80, Protocol::Http);
        let db = ServiceResource::new(5432, Protocol::Tcp);
        let deployments = vec![
            resolved(
                "db",
                ProvidedResources { services: vec![db.clone()], ..Default::default() },
                RequiredResources::default(),
            ),
            resolved(
                "web",
                ProvidedResources { services: vec![http.clone()], ..Default::default() },
                RequiredResources { services: vec![db], ..Default::default() },
            ),
            resolved(
                "worker",
                ProvidedResources::default(),
                RequiredResources { services: vec![http], ..Default::default() },
            ),
        ];
        let check = check_dependencies(&deployments);
        let graph = DeploymentGraph::build(&deployments, &check.satisfied);
        assert!(graph.direct().has_edge(&"worker".to_string(), &"web".to_string()));
        assert!(!graph.direct().has_edge(&"worker".to_string(), &"db".to_string()));
        assert!(graph.depends_on("worker", "db"));
        assert_eq!(graph.direct().edge_count(), check.satisfied.len());
    }
}
