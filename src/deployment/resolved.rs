//! Deployments and their resolution against package definitions.
//!
//! A [`ResolvedDeployment`] is built once per check/plan cycle. Its resource
//! sets are computed at construction from the package definition and the
//! enabled features, and never change afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use crate::error::ResolveError;
use crate::resources::{AttachedProvided, AttachedRequired};

use super::package::PackageSpec;
use super::source::PackageSource;

/// A deployment as declared in a pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment name; may contain `/`.
    pub name: String,
    /// Path of the deployed package.
    pub package: String,
    /// Names of enabled features.
    #[serde(default)]
    pub features: Vec<String>,
    /// Whether the deployment is disabled.
    #[serde(default)]
    pub disabled: bool,
}

/// A deployment bound to its package definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDeployment {
    deployment: Deployment,
    #[serde(skip)]
    package: Arc<PackageSpec>,
    enabled_features: Vec<String>,
    definition_files: Vec<String>,
    provided: AttachedProvided,
    required: AttachedRequired,
}

/// Normalizes a deployment name into the app name used on the host.
#[must_use]
pub fn app_name(deployment_name: &str) -> String {
    deployment_name.replace('/', "_")
}

impl Deployment {
    /// Creates an enabled deployment of `package` without features.
    #[must_use]
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            features: vec![],
            disabled: false,
        }
    }

    /// Enables the given features.
    #[must_use]
    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.features.extend(features.iter().map(ToString::to_string));
        self
    }

    /// Marks the deployment as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl ResolvedDeployment {
    /// Resolves a deployment against its package definition.
    ///
    /// # Errors
    ///
    /// Returns an error if an enabled feature is not declared by the package.
    pub fn new(deployment: Deployment, package: Arc<PackageSpec>) -> Result<Self, ResolveError> {
        let enabled: BTreeSet<&str> = deployment.features.iter().map(String::as_str).collect();
        let mut features = BTreeMap::new();
        for name in enabled {
            let spec = package
                .features
                .get(name)
                .ok_or_else(|| ResolveError::FeatureNotFound {
                    deployment: deployment.name.clone(),
                    package: package.path.clone(),
                    feature: name.to_string(),
                })?;
            features.insert(name, spec);
        }

        let mut trail: Vec<String> = Vec::new();
        if !package.repo.is_empty() {
            trail.push(package.repo.clone());
        }
        trail.push(package.path.clone());
        trail.push(format!("deployment {}", deployment.name));

        let origin = |leaf: Option<String>| -> Vec<String> {
            let mut origin = trail.clone();
            origin.extend(leaf);
            origin
        };

        let mut provided = AttachedProvided::default();
        let mut required = AttachedRequired::default();
        let mut definition_files = package.deployment.definition_files.clone();

        provided.extend_from(&package.host.provides, &origin(Some(String::from("host"))));
        provided.extend_from(&package.deployment.provides, &origin(None));
        required.extend_from(&package.deployment.requires, &origin(None));

        for (name, feature) in &features {
            let feature_origin = origin(Some(format!("feature {name}")));
            provided.extend_from(&feature.provides, &feature_origin);
            required.extend_from(&feature.requires, &feature_origin);
            definition_files.extend(feature.definition_files.iter().cloned());
        }

        debug!(
            "Resolved deployment {}: {} provided, {} required resources",
            deployment.name,
            provided.len(),
            required.len()
        );

        Ok(Self {
            enabled_features: features.keys().map(ToString::to_string).collect(),
            deployment,
            package,
            definition_files,
            provided,
            required,
        })
    }

    /// Deployment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.deployment.name
    }

    /// App name on the host.
    #[must_use]
    pub fn app_name(&self) -> String {
        app_name(&self.deployment.name)
    }

    /// The underlying deployment declaration.
    #[must_use]
    pub const fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// The resolved package definition.
    #[must_use]
    pub fn package(&self) -> &PackageSpec {
        &self.package
    }

    /// Enabled feature names, sorted.
    #[must_use]
    pub fn enabled_features(&self) -> &[String] {
        &self.enabled_features
    }

    /// App definition files of the deployment and its enabled features.
    #[must_use]
    pub fn definition_files(&self) -> &[String] {
        &self.definition_files
    }

    /// Resources this deployment provides, host-level ones included.
    #[must_use]
    pub const fn provided(&self) -> &AttachedProvided {
        &self.provided
    }

    /// Resources this deployment requires.
    #[must_use]
    pub const fn required(&self) -> &AttachedRequired {
        &self.required
    }

    /// Returns true if the deployment is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.deployment.disabled
    }

    /// Returns true if the deployment results in an app on the host.
    #[must_use]
    pub fn is_deployable(&self) -> bool {
        self.is_enabled() && !self.definition_files.is_empty()
    }
}

/// Resolves every deployment through `source`, sorted by name.
///
/// # Errors
///
/// Returns an error on duplicate names, unknown packages, or unknown features.
pub fn resolve_deployments<S: PackageSource + ?Sized>(
    deployments: &[Deployment],
    source: &S,
) -> Result<Vec<Arc<ResolvedDeployment>>, ResolveError> {
    let mut by_name: BTreeMap<&str, &Deployment> = BTreeMap::new();
    for deployment in deployments {
        if by_name.insert(&deployment.name, deployment).is_some() {
            return Err(ResolveError::DuplicateDeployment {
                name: deployment.name.clone(),
            });
        }
    }

    by_name
        .into_values()
        .map(|deployment| {
            let package = source.load_package(&deployment.package).ok_or_else(|| {
                ResolveError::PackageNotFound {
                    deployment: deployment.name.clone(),
                    package: deployment.package.clone(),
                }
            })?;
            ResolvedDeployment::new(deployment.clone(), package).map(Arc::new)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{FeatureSpec, PackageCatalog};
    use crate::resources::{NetworkResource, Protocol, ServiceResource};

    fn test_package() -> PackageSpec {
        let mut package = PackageSpec::new("github.com/example/pallet/web");
        package.repo = String::from("github.com/example/pallet");
        package.deployment.definition_files = vec![String::from("compose.yml")];
        package
            .deployment
            .provides
            .networks
            .push(NetworkResource::new("app-net"));
        package.features.insert(
            String::from("metrics"),
            FeatureSpec {
                definition_files: vec![String::from("compose-metrics.yml")],
                provides: crate::resources::ProvidedResources {
                    services: vec![ServiceResource::new(9100, Protocol::Http)],
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        package
    }

    #[test]
    fn test_app_name_replaces_separators() {
        assert_eq!(app_name("infra/caddy"), "infra_caddy");
        assert_eq!(app_name("web"), "web");
    }

    #[test]
    fn test_features_extend_resources() {
        let package = Arc::new(test_package());
        let plain = ResolvedDeployment::new(Deployment::new("web", &package.path), package.clone())
            .expect("resolve without features");
        assert_eq!(plain.provided().len(), 1);
        assert_eq!(plain.definition_files().len(), 1);

        let with_metrics = ResolvedDeployment::new(
            Deployment::new("web", &package.path).with_features(&["metrics"]),
            package,
        )
        .expect("resolve with features");
        assert_eq!(with_metrics.provided().len(), 2);
        assert_eq!(with_metrics.definition_files().len(), 2);
        assert_eq!(
            with_metrics.provided().services[0].origin,
            vec![
                "github.com/example/pallet",
                "github.com/example/pallet/web",
                "deployment web",
                "feature metrics"
            ]
        );
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let package = Arc::new(test_package());
        let result = ResolvedDeployment::new(
            Deployment::new("web", &package.path).with_features(&["nope"]),
            package,
        );
        assert!(matches!(result, Err(ResolveError::FeatureNotFound { .. })));
    }

    #[test]
    fn test_deployable_requires_definition_and_enabled() {
        let package = Arc::new(test_package());
        let disabled =
            ResolvedDeployment::new(Deployment::new("web", &package.path).disabled(), package)
                .expect("resolve");
        assert!(!disabled.is_deployable());

        let metadata_only = ResolvedDeployment::new(
            Deployment::new("docs", "pkg/docs"),
            Arc::new(PackageSpec::new("pkg/docs")),
        )
        .expect("resolve");
        assert!(!metadata_only.is_deployable());
    }

    #[test]
    fn test_resolve_sorts_and_rejects_duplicates() {
        let catalog = PackageCatalog::new([test_package()]);
        let path = "github.com/example/pallet/web";

        let resolved = resolve_deployments(
            &[Deployment::new("b", path), Deployment::new("a", path)],
            &catalog,
        )
        .expect("resolve");
        let names: Vec<&str> = resolved.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let duplicate = resolve_deployments(
            &[Deployment::new("a", path), Deployment::new("a", path)],
            &catalog,
        );
        assert!(matches!(duplicate, Err(ResolveError::DuplicateDeployment { .. })));

        let missing = resolve_deployments(&[Deployment::new("a", "pkg/missing")], &catalog);
        assert!(matches!(missing, Err(ResolveError::PackageNotFound { .. })));
    }
}
