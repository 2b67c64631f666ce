//! Deployment model.
//!
//! This module handles everything between the package-loading collaborator
//! and the checker:
//! - Package definitions with host, deployment and feature resources
//! - Layered package lookup (overlay over underlay)
//! - Resolution of deployments into immutable [`ResolvedDeployment`]s

mod package;
mod resolved;
mod source;

pub use package::{DeploymentSpec, FeatureSpec, HostSpec, PackageSpec};
pub use resolved::{Deployment, ResolvedDeployment, app_name, resolve_deployments};
pub use source::{LayeredPackageSource, PackageCatalog, PackageSource};
