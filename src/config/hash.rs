//! Definition hashing for change detection.
//!
//! Deployment hashes are recorded on live apps so an Update can tell whether
//! the definition actually changed. Plan fingerprints identify a plan
//! independently of when it was computed.

use sha2::{Digest, Sha256};

use crate::deployment::ResolvedDeployment;
use crate::planner::ReconciliationPlan;

/// Hasher for deployment definitions and plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefinitionHasher;

impl DefinitionHasher {
    /// Creates a new hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Hashes everything that determines the app a deployment produces.
    #[must_use]
    pub fn hash_deployment(&self, deployment: &ResolvedDeployment) -> String {
        let mut hasher = Sha256::new();
        let package = deployment.package();

        update_field(&mut hasher, deployment.name());
        update_field(&mut hasher, &package.repo);
        update_field(&mut hasher, &package.path);

        // Features are already sorted, definition files keep their declared order
        for feature in deployment.enabled_features() {
            update_field(&mut hasher, feature);
        }
        hasher.update([0u8]);
        for file in deployment.definition_files() {
            update_field(&mut hasher, file);
        }

        hex::encode(hasher.finalize())
    }

    /// Fingerprints a plan: its changes, pruned edges, execution order and mode.
    #[must_use]
    pub fn fingerprint_plan(&self, plan: &ReconciliationPlan) -> String {
        let mut hasher = Sha256::new();
        update_field(&mut hasher, &plan.mode().to_string());

        for (name, change) in plan.changes() {
            update_field(&mut hasher, name);
            update_field(&mut hasher, &change.kind.to_string());
            if let Some(deployment) = &change.deployment {
                update_field(&mut hasher, &self.hash_deployment(deployment));
            }
        }

        for (name, prerequisites) in plan.graph().iter() {
            update_field(&mut hasher, name);
            for prerequisite in prerequisites {
                update_field(&mut hasher, prerequisite);
            }
            hasher.update([1u8]);
        }

        if let Some(order) = plan.order() {
            for name in order {
                update_field(&mut hasher, name);
            }
        }

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two hashes.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        hash1.len() == hash2.len()
            && hash1
                .bytes()
                .zip(hash2.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// Length-prefixed so adjacent fields cannot run into each other.
fn update_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{Deployment, FeatureSpec, PackageSpec};
    use std::sync::Arc;

    fn package() -> Arc<PackageSpec> {
        let mut package = PackageSpec::new("pkg/web");
        package.deployment.definition_files = vec![String::from("compose.yml")];
        package.features.insert(
            String::from("tls"),
            FeatureSpec {
                definition_files: vec![String::from("compose-tls.yml")],
                ..Default::default()
            },
        );
        Arc::new(package)
    }

    fn resolve(deployment: Deployment) -> ResolvedDeployment {
        ResolvedDeployment::new(deployment, package()).expect("resolve")
    }

    #[test]
    fn test_deployment_hash_deterministic() {
        let hasher = DefinitionHasher::new();
        let web = resolve(Deployment::new("web", "pkg/web"));
        assert_eq!(hasher.hash_deployment(&web), hasher.hash_deployment(&web));
    }

    #[test]
    fn test_features_change_hash() {
        let hasher = DefinitionHasher::new();
        let plain = resolve(Deployment::new("web", "pkg/web"));
        let tls = resolve(Deployment::new("web", "pkg/web").with_features(&["tls"]));
        let renamed = resolve(Deployment::new("web2", "pkg/web"));

        assert_ne!(hasher.hash_deployment(&plain), hasher.hash_deployment(&tls));
        assert_ne!(hasher.hash_deployment(&plain), hasher.hash_deployment(&renamed));
    }

    #[test]
    fn test_short_hash() {
        let hasher = DefinitionHasher::new();
        let short = hasher.short_hash("abcdef1234567890abcdef1234567890");
        assert_eq!(short, "abcdef12");
    }

    #[test]
    fn test_hashes_match() {
        assert!(DefinitionHasher::hashes_match("abc123", "abc123"));
        assert!(!DefinitionHasher::hashes_match("abc123", "abc124"));
        assert!(!DefinitionHasher::hashes_match("abc123", "abc12"));
    }
}
