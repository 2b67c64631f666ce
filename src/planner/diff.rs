//! Classification of desired deployments against live apps.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::deployment::ResolvedDeployment;
use crate::runtime::LiveApp;

use super::change::ReconciliationChange;

/// Computes the changes that bring the host to the desired state, keyed by
/// app name.
///
/// - desired and deployable, not live: Add
/// - desired and deployable, live: Update
/// - live, and not desired or no longer deployable: Remove
/// - desired but not deployable, not live: nothing
///
/// When several deployments map to one app, a deployable one is preferred,
/// then the first by deployment name.
#[must_use]
pub fn classify_changes(
    desired: &[Arc<ResolvedDeployment>],
    live: &[LiveApp],
) -> BTreeMap<String, ReconciliationChange> {
    let live_by_name: BTreeMap<&str, &LiveApp> =
        live.iter().map(|app| (app.name.as_str(), app)).collect();

    let mut desired_by_app: BTreeMap<String, &Arc<ResolvedDeployment>> = BTreeMap::new();
    let mut sorted: Vec<&Arc<ResolvedDeployment>> = desired.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    for deployment in sorted {
        let app = deployment.app_name();
        if let Some(existing) = desired_by_app.get(&app) {
            // A deployable claimant keeps the app over one that is not.
            let (kept, ignored) = if !existing.is_deployable() && deployment.is_deployable() {
                (deployment, *existing)
            } else {
                (*existing, deployment)
            };
            warn!(
                "Deployments {} and {} both map to app {app}; ignoring {}",
                existing.name(),
                deployment.name(),
                ignored.name()
            );
            desired_by_app.insert(app, kept);
            continue;
        }
        desired_by_app.insert(app, deployment);
    }

    let mut changes = BTreeMap::new();
    for (app, deployment) in &desired_by_app {
        let change = match (deployment.is_deployable(), live_by_name.get(app.as_str())) {
            (true, None) => ReconciliationChange::add(Arc::clone(deployment)),
            (true, Some(live)) => ReconciliationChange::update(Arc::clone(deployment), (*live).clone()),
            (false, Some(live)) => ReconciliationChange::remove((*live).clone()),
            (false, None) => {
                debug!("Deployment {} has no app to deploy", deployment.name());
                continue;
            }
        };
        changes.insert(app.clone(), change);
    }

    for (name, app) in live_by_name {
        if !desired_by_app.contains_key(name) {
            debug!("Found orphaned app: {name}");
            changes.insert(name.to_string(), ReconciliationChange::remove(app.clone()));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{Deployment, PackageSpec};
    use crate::planner::ChangeKind;

    fn resolved(deployment: Deployment, deployable: bool) -> Arc<ResolvedDeployment> {
        let mut package = PackageSpec::new(deployment.package.clone());
        if deployable {
            package.deployment.definition_files = vec![String::from("compose.yml")];
        }
        Arc::new(ResolvedDeployment::new(deployment, Arc::new(package)).expect("resolve"))
    }

    fn kinds(changes: &BTreeMap<String, ReconciliationChange>) -> Vec<(&str, ChangeKind)> {
        changes.iter().map(|(name, c)| (name.as_str(), c.kind)).collect()
    }

    #[test]
    fn test_classification() {
        let desired = vec![
            resolved(Deployment::new("new", "pkg/new"), true),
            resolved(Deployment::new("kept", "pkg/kept"), true),
            resolved(Deployment::new("off", "pkg/off").disabled(), true),
            resolved(Deployment::new("docs", "pkg/docs"), false),
        ];
        let live = vec![LiveApp::new("kept"), LiveApp::new("off"), LiveApp::new("orphan")];

        let changes = classify_changes(&desired, &live);
        assert_eq!(
            kinds(&changes),
            vec![
                ("kept", ChangeKind::Update),
                ("new", ChangeKind::Add),
                ("off", ChangeKind::Remove),
                ("orphan", ChangeKind::Remove),
            ]
        );
        assert!(changes["kept"].app.is_some());
        assert!(changes["new"].app.is_none());
        assert!(changes["orphan"].deployment.is_none());
    }

    #[test]
    fn test_matches_live_apps_by_normalized_name() {
        let desired = vec![resolved(Deployment::new("infra/caddy", "pkg/caddy"), true)];
        let live = vec![LiveApp::new("infra_caddy")];

        let changes = classify_changes(&desired, &live);
        assert_eq!(kinds(&changes), vec![("infra_caddy", ChangeKind::Update)]);
    }

    #[test]
    fn test_disabled_deployment_does_not_shadow_enabled_one() {
        let desired = vec![
            resolved(Deployment::new("infra/web", "pkg/web").disabled(), true),
            resolved(Deployment::new("infra_web", "pkg/web"), true),
        ];
        let live = vec![LiveApp::new("infra_web")];

        let changes = classify_changes(&desired, &live);
        assert_eq!(kinds(&changes), vec![("infra_web", ChangeKind::Update)]);
        let kept = changes["infra_web"].deployment.as_ref().expect("deployment");
        assert_eq!(kept.name(), "infra_web");
    }

    #[test]
    fn test_first_deployable_claimant_wins() {
        let desired = vec![
            resolved(Deployment::new("infra_web", "pkg/b"), true),
            resolved(Deployment::new("infra/web", "pkg/a"), true),
        ];

        let changes = classify_changes(&desired, &[]);
        let kept = changes["infra_web"].deployment.as_ref().expect("deployment");
        assert_eq!(kept.name(), "infra/web");
    }

    #[test]
    fn test_no_changes_for_empty_state() {
        assert!(classify_changes(&[], &[]).is_empty());
    }
}
