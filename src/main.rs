//! Forklift CLI entrypoint.
//!
//! This is the main entrypoint for the forklift command-line tool. The host
//! is simulated in memory from the apps recorded in the snapshot.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use forklift::cli::{ApplyArgs, Cli, Commands, OutputFormatter};
use forklift::config::{ConfigParser, DeploymentSnapshot, ForkliftConfig, LoggingConfig, find_config_file};
use forklift::deployment::ResolvedDeployment;
use forklift::error::Result;
use forklift::reconciler::Reconciler;
use forklift::runtime::{ContainerRuntime, MemoryRuntime};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.output);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, &config.logging);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, &config, &formatter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Loads `.env`, then settings from the given or discovered file.
fn load_config(path: Option<&Path>) -> Result<ForkliftConfig> {
    let parser = ConfigParser::new();
    parser.load_dotenv()?;

    let discovered = match path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(std::env::current_dir()?),
    };
    parser.load_with_env(discovered.as_deref())
}

/// Initializes the logging system. Logs go to stderr.
fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Main async entry point.
async fn run(cli: Cli, config: &ForkliftConfig, formatter: &OutputFormatter) -> Result<()> {
    let snapshot = ConfigParser::new().load_snapshot(&cli.snapshot)?;
    let desired = snapshot.resolve()?;
    debug!("Resolved {} deployments", desired.len());

    match cli.command {
        Commands::Check => cmd_check(&snapshot, &desired, config, formatter),
        Commands::Plan(args) => cmd_plan(&snapshot, &desired, config, args, formatter).await,
        Commands::Apply(args) => cmd_apply(&snapshot, &desired, config, args, formatter).await,
    }
}

/// Builds a reconciler over the host recorded in the snapshot.
fn reconciler(
    snapshot: &DeploymentSnapshot,
    config: &ForkliftConfig,
    args: ApplyArgs,
) -> (Reconciler, Arc<MemoryRuntime>) {
    let host = Arc::new(MemoryRuntime::with_apps(snapshot.host.apps.iter().cloned()));
    let mode = args.mode().unwrap_or_else(|| config.apply.mode());
    (Reconciler::new(host.clone(), mode), host)
}

/// Checks the deployments.
fn cmd_check(
    snapshot: &DeploymentSnapshot,
    desired: &[Arc<ResolvedDeployment>],
    config: &ForkliftConfig,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (reconciler, _) = reconciler(snapshot, config, ApplyArgs::default());
    let report = reconciler.check(desired);
    write_out(&formatter.format_report(&report))?;
    report.ensure_valid()?;
    Ok(())
}

/// Checks, then prints the plan.
async fn cmd_plan(
    snapshot: &DeploymentSnapshot,
    desired: &[Arc<ResolvedDeployment>],
    config: &ForkliftConfig,
    args: ApplyArgs,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (reconciler, _) = reconciler(snapshot, config, args);
    let report = reconciler.check(desired);
    if !report.is_valid() {
        write_out(&formatter.format_report(&report))?;
        report.ensure_valid()?;
    }

    let plan = reconciler.plan_from(desired, &report.satisfied).await?;
    write_out(&formatter.format_plan(&plan))
}

/// Checks, plans, and applies to the simulated host.
async fn cmd_apply(
    snapshot: &DeploymentSnapshot,
    desired: &[Arc<ResolvedDeployment>],
    config: &ForkliftConfig,
    args: ApplyArgs,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (reconciler, host) = reconciler(snapshot, config, args);
    let report = reconciler.check(desired);
    if !report.is_valid() {
        write_out(&formatter.format_report(&report))?;
        report.ensure_valid()?;
    }

    let plan = reconciler.plan_from(desired, &report.satisfied).await?;
    write_out(&formatter.format_plan(&plan))?;
    if plan.is_empty() {
        return Ok(());
    }

    let result = reconciler.apply(&plan).await?;
    info!("Host recorded {} effective changes", host.events().await.len());
    write_out(&formatter.format_result(&result))?;
    write_out(&formatter.format_apps(&host.list_apps().await?))
}

/// Writes command output to stdout.
fn write_out(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}
