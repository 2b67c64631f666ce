//! Dependency satisfaction across the whole deployment set.
//!
//! Every required resource is matched against every provided resource of the
//! same kind, the requirer's own included. Providers are scanned in
//! deployment-name order, then declaration order, so the first zero-reason
//! candidate is deterministic.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::deployment::ResolvedDeployment;
use crate::resources::{
    AttachedResource, FilesetResource, NetworkResource, Resource, ResourceSpec, ServiceResource,
};

/// A requirement matched by a provided resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatisfiedDependency {
    /// Requiring deployment.
    pub deployment: String,
    /// The required resource.
    pub required: AttachedResource<Resource>,
    /// Providing deployment.
    pub provider_deployment: String,
    /// The provided resource that satisfies it.
    pub provider: AttachedResource<Resource>,
}

impl SatisfiedDependency {
    /// Returns true if the requirement constrains ordering.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.required.resource.is_nonblocking()
    }

    /// Returns true if the deployment satisfies its own requirement.
    #[must_use]
    pub fn is_self_satisfied(&self) -> bool {
        self.deployment == self.provider_deployment
    }
}

/// A provided resource that came closest to satisfying a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Providing deployment.
    pub deployment: String,
    /// The provided resource.
    pub provided: AttachedResource<Resource>,
    /// Why it does not satisfy the requirement.
    pub reasons: Vec<String>,
}

/// A requirement nothing satisfies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    /// Requiring deployment.
    pub deployment: String,
    /// The required resource.
    pub required: AttachedResource<Resource>,
    /// All candidates tied for the fewest unmet reasons. Empty when nothing
    /// of the same kind is provided.
    pub best_candidates: Vec<Candidate>,
}

/// Outcome of checking every requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyCheck {
    /// Satisfied requirements.
    pub satisfied: Vec<SatisfiedDependency>,
    /// Unsatisfied requirements.
    pub missing: Vec<MissingDependency>,
}

enum Outcome {
    Satisfied(SatisfiedDependency),
    Missing(MissingDependency),
}

fn match_requirement<R: ResourceSpec>(
    deployment: &str,
    required: &AttachedResource<R>,
    providers: &[(&str, &AttachedResource<R>)],
) -> Outcome {
    let mut fewest = usize::MAX;
    let mut best: Vec<Candidate> = Vec::new();

    for (provider_deployment, provided) in providers {
        let reasons = required.resource.unmet_by(&provided.resource);
        if reasons.is_empty() {
            return Outcome::Satisfied(SatisfiedDependency {
                deployment: deployment.to_string(),
                required: required.erase(),
                provider_deployment: (*provider_deployment).to_string(),
                provider: provided.erase(),
            });
        }

        if reasons.len() < fewest {
            fewest = reasons.len();
            best.clear();
        }
        if reasons.len() == fewest {
            best.push(Candidate {
                deployment: (*provider_deployment).to_string(),
                provided: provided.erase(),
                reasons,
            });
        }
    }

    Outcome::Missing(MissingDependency {
        deployment: deployment.to_string(),
        required: required.erase(),
        best_candidates: best,
    })
}

fn check_kind<R: ResourceSpec>(deployments: &[&ResolvedDeployment], check: &mut DependencyCheck) {
    let providers: Vec<(&str, &AttachedResource<R>)> = deployments
        .iter()
        .flat_map(|d| R::select_provided(d.provided()).iter().map(move |r| (d.name(), r)))
        .collect();

    for deployment in deployments {
        for required in R::select_required(deployment.required()) {
            match match_requirement(deployment.name(), required, &providers) {
                Outcome::Satisfied(satisfied) => {
                    debug!(
                        "{} requirement {} satisfied by {}",
                        satisfied.deployment, satisfied.required.resource, satisfied.provider_deployment
                    );
                    check.satisfied.push(satisfied);
                }
                Outcome::Missing(missing) => {
                    debug!(
                        "{} requirement {} is unmet ({} candidates)",
                        missing.deployment,
                        missing.required.resource,
                        missing.best_candidates.len()
                    );
                    check.missing.push(missing);
                }
            }
        }
    }
}

/// Matches every requirement of every deployment against all providers.
#[must_use]
pub fn check_dependencies(deployments: &[Arc<ResolvedDeployment>]) -> DependencyCheck {
    let mut sorted: Vec<&ResolvedDeployment> = deployments.iter().map(|d| &**d).collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let mut check = DependencyCheck::default();
    check_kind::<NetworkResource>(&sorted, &mut check);
    check_kind::<ServiceResource>(&sorted, &mut check);
    check_kind::<FilesetResource>(&sorted, &mut check);

    check
        .satisfied
        .sort_by(|a, b| a.deployment.cmp(&b.deployment));
    check.missing.sort_by(|a, b| a.deployment.cmp(&b.deployment));
    check
}
