//! Individual reconciliation changes.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::config::DefinitionHasher;
use crate::deployment::ResolvedDeployment;
use crate::runtime::LiveApp;

/// What a change does to an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Create an app that is not on the host.
    Add,
    /// Redeploy an app that is already on the host.
    Update,
    /// Tear down an app.
    Remove,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Update => write!(f, "update"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A change to one app on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationChange {
    /// Kind of change.
    pub kind: ChangeKind,
    /// App name on the host.
    pub name: String,
    /// Deployment the app is built from. `None` for removals.
    #[serde(serialize_with = "serialize_deployment_name")]
    pub deployment: Option<Arc<ResolvedDeployment>>,
    /// The app as currently live. `None` for additions.
    pub app: Option<LiveApp>,
}

impl ReconciliationChange {
    /// Creates an addition.
    #[must_use]
    pub fn add(deployment: Arc<ResolvedDeployment>) -> Self {
        Self {
            kind: ChangeKind::Add,
            name: deployment.app_name(),
            deployment: Some(deployment),
            app: None,
        }
    }

    /// Creates an update of a live app.
    #[must_use]
    pub fn update(deployment: Arc<ResolvedDeployment>, app: LiveApp) -> Self {
        Self {
            kind: ChangeKind::Update,
            name: app.name.clone(),
            deployment: Some(deployment),
            app: Some(app),
        }
    }

    /// Creates a removal of a live app.
    #[must_use]
    pub fn remove(app: LiveApp) -> Self {
        Self {
            kind: ChangeKind::Remove,
            name: app.name.clone(),
            deployment: None,
            app: Some(app),
        }
    }

    /// Returns true for removals.
    #[must_use]
    pub fn is_remove(&self) -> bool {
        self.kind == ChangeKind::Remove
    }

    /// Name of the originating deployment, if any.
    #[must_use]
    pub fn deployment_name(&self) -> Option<&str> {
        self.deployment.as_deref().map(ResolvedDeployment::name)
    }

    /// For updates, whether the definition differs from the one the live app
    /// was deployed from. `None` when unknown or not an update.
    #[must_use]
    pub fn definition_changed(&self, hasher: &DefinitionHasher) -> Option<bool> {
        if self.kind != ChangeKind::Update {
            return None;
        }
        let recorded = self.app.as_ref()?.definition_hash.as_deref()?;
        let deployment = self.deployment.as_deref()?;
        Some(!DefinitionHasher::hashes_match(
            recorded,
            &hasher.hash_deployment(deployment),
        ))
    }

    /// One-line description for plan output.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.kind, self.deployment_name()) {
            (ChangeKind::Remove, _) | (_, None) => format!("{} app {}", self.kind, self.name),
            (kind, Some(deployment)) if deployment == self.name => format!("{kind} app {deployment}"),
            (kind, Some(deployment)) => format!("{kind} app {} (deployment {deployment})", self.name),
        }
    }
}

impl fmt::Display for ReconciliationChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

fn serialize_deployment_name<S: Serializer>(
    deployment: &Option<Arc<ResolvedDeployment>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match deployment {
        Some(d) => serializer.serialize_some(d.name()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{Deployment, PackageSpec};

    fn resolved(name: &str) -> Arc<ResolvedDeployment> {
        let mut package = PackageSpec::new("pkg/proxy");
        package.deployment.definition_files = vec![String::from("compose.yml")];
        Arc::new(
            ResolvedDeployment::new(Deployment::new(name, "pkg/proxy"), Arc::new(package))
                .expect("resolve"),
        )
    }

    #[test]
    fn test_describe_uses_app_name() {
        let change = ReconciliationChange::add(resolved("infra/caddy"));
        assert_eq!(change.name, "infra_caddy");
        assert_eq!(change.describe(), "add app infra_caddy (deployment infra/caddy)");
        assert_eq!(
            ReconciliationChange::remove(LiveApp::new("old")).describe(),
            "remove app old"
        );
    }

    #[test]
    fn test_definition_changed() {
        let hasher = DefinitionHasher::new();
        let deployment = resolved("web");

        let unknown = ReconciliationChange::update(deployment.clone(), LiveApp::new("web"));
        assert_eq!(unknown.definition_changed(&hasher), None);

        let current = LiveApp {
            name: String::from("web"),
            definition_hash: Some(hasher.hash_deployment(&deployment)),
        };
        let unchanged = ReconciliationChange::update(deployment.clone(), current);
        assert_eq!(unchanged.definition_changed(&hasher), Some(false));

        let stale = LiveApp {
            name: String::from("web"),
            definition_hash: Some(String::from("0000")),
        };
        let changed = ReconciliationChange::update(deployment, stale);
        assert_eq!(changed.definition_changed(&hasher), Some(true));
    }

    #[test]
    fn test_serializes_deployment_by_name() {
        let change = ReconciliationChange::add(resolved("web"));
        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(json["kind"], "add");
        assert_eq!(json["deployment"], "web");
    }
}
