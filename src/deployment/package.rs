//! Package definitions as handed over by the package-loading collaborator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resources::{ProvidedResources, RequiredResources};

/// A package definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Full package path (e.g. `github.com/org/repo/pkg/caddy`).
    pub path: String,
    /// Path of the repository the package comes from.
    #[serde(default)]
    pub repo: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Resources the host already provides when this package is present.
    #[serde(default)]
    pub host: HostSpec,
    /// The base deployment of the package.
    #[serde(default)]
    pub deployment: DeploymentSpec,
    /// Optional features, keyed by name.
    #[serde(default)]
    pub features: BTreeMap<String, FeatureSpec>,
}

/// Host-level resources of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    /// Provided resources.
    #[serde(default)]
    pub provides: ProvidedResources,
}

/// The base deployment section of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// App definition files. A package without any is metadata-only.
    #[serde(default)]
    pub definition_files: Vec<String>,
    /// Provided resources.
    #[serde(default)]
    pub provides: ProvidedResources,
    /// Required resources.
    #[serde(default)]
    pub requires: RequiredResources,
}

/// An optional feature of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Additional app definition files.
    #[serde(default)]
    pub definition_files: Vec<String>,
    /// Provided resources.
    #[serde(default)]
    pub provides: ProvidedResources,
    /// Required resources.
    #[serde(default)]
    pub requires: RequiredResources,
}

impl PackageSpec {
    /// Creates an empty package at the given path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}
