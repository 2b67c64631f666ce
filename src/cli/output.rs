//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::checker::ValidationReport;
use crate::config::DefinitionHasher;
use crate::planner::{ChangeKind, ReconciliationPlan};
use crate::reconciler::ReconciliationResult;
use crate::runtime::LiveApp;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
    hasher: DefinitionHasher,
}

/// Plan change row for table display.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "Waits for")]
    waits_for: String,
}

/// Live app row for table display.
#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "App")]
    name: String,
    #[tabled(rename = "Definition")]
    definition: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            hasher: DefinitionHasher::new(),
        }
    }

    /// Formats a validation report for display.
    #[must_use]
    pub fn format_report(&self, report: &ValidationReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text if report.is_valid() => format!(
                "{} No conflicts; {} dependencies satisfied.\n",
                "✓".green(),
                report.satisfied.len()
            ),
            OutputFormat::Text => format!("{} Validation failed\n{report}", "✗".red()),
        }
    }

    /// Formats a reconciliation plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &ReconciliationPlan) -> String {
        let fingerprint = self.hasher.fingerprint_plan(plan);
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "fingerprint": fingerprint,
                    "summary": plan.summary(),
                    "plan": plan,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => self.format_plan_text(plan, &fingerprint),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(&self, plan: &ReconciliationPlan, fingerprint: &str) -> String {
        if plan.is_empty() {
            return format!("{} No changes required - host is up to date.\n", "✓".green());
        }

        let mut output = String::new();
        let _ = writeln!(output, "\nReconciliation plan ({} mode)", plan.mode());
        let _ = writeln!(output, "   Fingerprint: {}\n", self.hasher.short_hash(fingerprint));

        let names: Vec<String> = plan
            .order()
            .map_or_else(|| plan.changes().keys().cloned().collect(), <[String]>::to_vec);
        let rows: Vec<ChangeRow> = names
            .iter()
            .filter_map(|name| plan.change(name))
            .map(|change| ChangeRow {
                change: Self::format_change_kind(change.kind),
                app: change.name.clone(),
                deployment: change.deployment_name().unwrap_or("-").to_string(),
                waits_for: plan
                    .prerequisites(&change.name)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        if let Some(order) = plan.order() {
            let _ = writeln!(output, "\nOrder: {}", order.join(" -> "));
        }
        for cycle in plan.cycles() {
            let _ = writeln!(
                output,
                "{} Dependency cycle, order within it is arbitrary: [{}]",
                "⚠".yellow(),
                cycle.join(", ")
            );
        }

        let summary = plan.summary();
        let _ = writeln!(
            output,
            "\nPlan: {} to add, {} to update, {} to remove",
            summary.adds.to_string().green(),
            summary.updates.to_string().yellow(),
            summary.removes.to_string().red()
        );
        output
    }

    /// Formats the result of applying a plan.
    #[must_use]
    pub fn format_result(&self, result: &ReconciliationResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Text => {
                let execution = &result.execution;
                format!(
                    "{} Applied plan {} in {} ms: {} added, {} updated, {} removed\n",
                    "✓".green(),
                    self.hasher.short_hash(&result.fingerprint),
                    execution.duration_ms(),
                    execution.count(ChangeKind::Add),
                    execution.count(ChangeKind::Update),
                    execution.count(ChangeKind::Remove)
                )
            }
        }
    }

    /// Formats the apps on a host.
    #[must_use]
    pub fn format_apps(&self, apps: &[LiveApp]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(apps).unwrap_or_default(),
            OutputFormat::Text if apps.is_empty() => String::from("Host has no apps.\n"),
            OutputFormat::Text => {
                let rows: Vec<AppRow> = apps
                    .iter()
                    .map(|app| AppRow {
                        name: app.name.clone(),
                        definition: app
                            .definition_hash
                            .as_deref()
                            .map_or_else(|| String::from("-"), |h| self.hasher.short_hash(h)),
                    })
                    .collect();
                format!("\nHost apps\n{}\n", Table::new(rows))
            }
        }
    }

    /// Formats a change kind with color.
    fn format_change_kind(kind: ChangeKind) -> String {
        match kind {
            ChangeKind::Add => "+add".green().to_string(),
            ChangeKind::Update => "~update".yellow().to_string(),
            ChangeKind::Remove => "-remove".red().to_string(),
        }
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "error", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✗".red()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::check_dependencies;
    use crate::deployment::{Deployment, PackageSpec, ResolvedDeployment};
    use crate::graph::DeploymentGraph;
    use crate::planner::{ExecutionMode, Planner};
    use std::sync::Arc;

    fn plan() -> ReconciliationPlan {
        let mut package = PackageSpec::new("pkg/web");
        package.deployment.definition_files = vec![String::from("compose.yml")];
        let desired = vec![Arc::new(
            ResolvedDeployment::new(Deployment::new("web", "pkg/web"), Arc::new(package))
                .expect("resolve"),
        )];
        let check = check_dependencies(&desired);
        let deps = DeploymentGraph::build(&desired, &check.satisfied);
        Planner::new(ExecutionMode::Serial)
            .plan(&desired, &deps, &[LiveApp::new("old")])
            .expect("plan")
    }

    #[test]
    fn test_plan_text_lists_changes() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&plan());
        assert!(text.contains("+add"));
        assert!(text.contains("-remove"));
        assert!(text.contains("Order: old -> web"));
        assert!(text.contains("1 to add, 0 to update, 1 to remove"));
    }

    #[test]
    fn test_plan_json() {
        let json = OutputFormatter::new(OutputFormat::Json).format_plan(&plan());
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["summary"]["adds"], 1);
        assert_eq!(value["plan"]["order"][0], "old");
        assert_eq!(value["plan"]["graph"]["web"][0], "old");
        assert_eq!(value["fingerprint"].as_str().map(str::len), Some(64));
    }

    #[test]
    fn test_empty_report() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_report(&ValidationReport::default());
        assert!(text.contains("No conflicts"));
    }
}
