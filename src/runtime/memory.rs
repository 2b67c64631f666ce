//! In-process host.
//!
//! Keeps apps in memory, records every effective change as a [`HostEvent`],
//! and can be told to fail specific apps.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DefinitionHasher;
use crate::deployment::ResolvedDeployment;
use crate::error::RuntimeError;

use super::client::{ContainerRuntime, LiveApp};

/// An effective change made to the in-memory host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A new app was created.
    Deployed(String),
    /// An existing app was redeployed from a different definition.
    Redeployed(String),
    /// An app was removed.
    Removed(String),
}

/// In-memory container host.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    apps: Mutex<BTreeMap<String, LiveApp>>,
    events: Mutex<Vec<HostEvent>>,
    failing: Mutex<BTreeSet<String>>,
    latency: Option<Duration>,
    hasher: DefinitionHasher,
}

impl MemoryRuntime {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host already running the given apps.
    #[must_use]
    pub fn with_apps(apps: impl IntoIterator<Item = LiveApp>) -> Self {
        Self {
            apps: Mutex::new(apps.into_iter().map(|a| (a.name.clone(), a)).collect()),
            ..Self::default()
        }
    }

    /// Delays every mutating call, to widen concurrency windows.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every later deploy or remove of `app` fail.
    pub async fn fail_on(&self, app: impl Into<String>) {
        self.failing.lock().await.insert(app.into());
    }

    /// Snapshot of the apps on the host.
    pub async fn apps(&self) -> Vec<LiveApp> {
        self.apps.lock().await.values().cloned().collect()
    }

    /// Effective changes in the order they happened.
    pub async fn events(&self) -> Vec<HostEvent> {
        self.events.lock().await.clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn is_failing(&self, app: &str) -> bool {
        self.failing.lock().await.contains(app)
    }
}

#[async_trait]
impl ContainerRuntime for MemoryRuntime {
    async fn list_apps(&self) -> Result<Vec<LiveApp>, RuntimeError> {
        Ok(self.apps().await)
    }

    async fn deploy_app(&self, app: &str, deployment: &ResolvedDeployment) -> Result<(), RuntimeError> {
        self.simulate_latency().await;
        if self.is_failing(app).await {
            return Err(RuntimeError::deploy_failed(app, "injected failure"));
        }

        let hash = self.hasher.hash_deployment(deployment);
        let mut apps = self.apps.lock().await;
        let event = match apps.get(app) {
            Some(existing) if existing.definition_hash.as_deref() == Some(hash.as_str()) => {
                debug!("App {app} is already up to date");
                None
            }
            Some(_) => Some(HostEvent::Redeployed(app.to_string())),
            None => Some(HostEvent::Deployed(app.to_string())),
        };
        apps.insert(
            app.to_string(),
            LiveApp {
                name: app.to_string(),
                definition_hash: Some(hash),
            },
        );
        drop(apps);

        if let Some(event) = event {
            info!("Deployed app {app}");
            self.events.lock().await.push(event);
        }
        Ok(())
    }

    async fn remove_app(&self, app: &str) -> Result<(), RuntimeError> {
        self.simulate_latency().await;
        if self.is_failing(app).await {
            return Err(RuntimeError::remove_failed(app, "injected failure"));
        }

        if self.apps.lock().await.remove(app).is_some() {
            info!("Removed app {app}");
            self.events.lock().await.push(HostEvent::Removed(app.to_string()));
        } else {
            debug!("App {app} was already removed");
        }
        Ok(())
    }

    fn runtime_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{Deployment, PackageSpec};
    use std::sync::Arc;

    fn resolved(name: &str) -> ResolvedDeployment {
        let mut package = PackageSpec::new(format!("pkg/{name}"));
        package.deployment.definition_files = vec![String::from("compose.yml")];
        ResolvedDeployment::new(Deployment::new(name, &package.path), Arc::new(package))
            .expect("resolve")
    }

    #[tokio::test]
    async fn test_deploy_is_idempotent() {
        let runtime = MemoryRuntime::new();
        let web = resolved("web");

        runtime.deploy_app("web", &web).await.expect("first deploy");
        runtime.deploy_app("web", &web).await.expect("second deploy");

        assert_eq!(runtime.events().await, vec![HostEvent::Deployed("web".into())]);
        assert_eq!(runtime.apps().await.len(), 1);
    }

    #[tokio::test]
    async fn test_redeploy_of_recorded_app() {
        let runtime = MemoryRuntime::with_apps([LiveApp::new("web")]);
        runtime.deploy_app("web", &resolved("web")).await.expect("deploy");
        assert_eq!(runtime.events().await, vec![HostEvent::Redeployed("web".into())]);
    }

    #[tokio::test]
    async fn test_remove_and_injected_failure() {
        let runtime = MemoryRuntime::with_apps([LiveApp::new("old"), LiveApp::new("stuck")]);
        runtime.fail_on("stuck").await;

        runtime.remove_app("old").await.expect("remove");
        runtime.remove_app("old").await.expect("remove again");
        let err = runtime.remove_app("stuck").await.expect_err("should fail");

        assert!(matches!(err, RuntimeError::RemoveFailed { .. }));
        assert_eq!(runtime.events().await, vec![HostEvent::Removed("old".into())]);
    }
}
