//! Runtime trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::deployment::ResolvedDeployment;
use crate::error::RuntimeError;

/// An app currently present on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveApp {
    /// App name (normalized deployment name).
    pub name: String,
    /// Hash of the definition the app was deployed from, if recorded.
    #[serde(default)]
    pub definition_hash: Option<String>,
}

impl LiveApp {
    /// Creates a live app without a recorded definition hash.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition_hash: None,
        }
    }
}

/// Trait for container runtime clients.
///
/// Individual calls must be safe to run concurrently with calls for
/// unrelated apps; the engine never locks the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists the apps on the host.
    async fn list_apps(&self) -> Result<Vec<LiveApp>, RuntimeError>;

    /// Creates or updates an app from a deployment. Must be idempotent.
    async fn deploy_app(&self, app: &str, deployment: &ResolvedDeployment) -> Result<(), RuntimeError>;

    /// Tears an app down.
    async fn remove_app(&self, app: &str) -> Result<(), RuntimeError>;

    /// Gets the runtime type name.
    fn runtime_name(&self) -> &'static str;
}
