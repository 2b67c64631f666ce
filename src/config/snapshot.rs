//! Deployment snapshots.
//!
//! A snapshot is what the package-loading side hands over: cached packages,
//! local overrides, the pallet's deployments, and optionally the apps
//! recorded on the host for dry runs.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::deployment::{
    Deployment, LayeredPackageSource, PackageCatalog, PackageSpec, ResolvedDeployment,
    resolve_deployments,
};
use crate::error::ResolveError;
use crate::runtime::LiveApp;

/// Everything the engine needs to check and plan one pallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentSnapshot {
    /// Packages from the package cache.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
    /// Locally overridden packages; these shadow cached ones.
    #[serde(default)]
    pub overrides: Vec<PackageSpec>,
    /// Deployments declared by the pallet.
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    /// Recorded host state.
    #[serde(default)]
    pub host: HostSnapshot,
}

/// Apps recorded on the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostSnapshot {
    /// Live apps.
    #[serde(default)]
    pub apps: Vec<LiveApp>,
}

impl DeploymentSnapshot {
    /// Resolves every deployment, looking packages up in the overrides
    /// before the cache.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate names, unknown packages, or unknown features.
    pub fn resolve(&self) -> Result<Vec<Arc<ResolvedDeployment>>, ResolveError> {
        let cache = PackageCatalog::new(self.packages.iter().cloned());
        let overrides = PackageCatalog::new(self.overrides.iter().cloned());
        resolve_deployments(&self.deployments, &LayeredPackageSource::new(&overrides, &cache))
    }
}
