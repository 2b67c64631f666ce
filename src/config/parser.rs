//! Configuration parser for loading settings and snapshots.
//!
//! Settings come from `forklift.yaml` when present, then environment
//! variables (optionally loaded from `.env`) override them.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::ForkliftConfig;
use super::snapshot::DeploymentSnapshot;

/// Overrides `apply.parallel`.
const ENV_PARALLEL: &str = "FORKLIFT_PARALLEL";
/// Overrides `logging.level`.
const ENV_LOG_LEVEL: &str = "FORKLIFT_LOG_LEVEL";
/// Overrides `logging.json`.
const ENV_LOG_JSON: &str = "FORKLIFT_LOG_JSON";

/// Parser for settings files and deployment snapshots.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ForkliftConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = read_file(path)?;
        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string. An empty document yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ForkliftConfig> {
        debug!("Parsing YAML configuration");
        if content.trim().is_empty() {
            return Ok(ForkliftConfig::default());
        }

        let config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::parse(format!("YAML parse error: {e}"), location(source)))?;
        Ok(config)
    }

    /// Loads settings with environment overrides. Without a path, defaults
    /// are used as the base.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or an override is invalid.
    pub fn load_with_env(&self, path: Option<&Path>) -> Result<ForkliftConfig> {
        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => ForkliftConfig::default(),
        };
        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean override cannot be parsed.
    pub fn apply_env_overrides(
        config: &mut ForkliftConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(value) = lookup(ENV_PARALLEL) {
            debug!("Overriding apply.parallel from environment");
            config.apply.parallel = parse_bool(ENV_PARALLEL, &value)?;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            debug!("Overriding logging.level from environment");
            config.logging.level = level;
        }

        if let Some(value) = lookup(ENV_LOG_JSON) {
            debug!("Overriding logging.json from environment");
            config.logging.json = parse_bool(ENV_LOG_JSON, &value)?;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ConfigError::parse(
                    format!("Failed to load .env file: {e}"),
                    env_path.display().to_string(),
                )
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Loads a deployment snapshot. `.json` files are read as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<DeploymentSnapshot> {
        let path = path.as_ref();
        info!("Loading deployment snapshot from: {}", path.display());
        let content = read_file(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let snapshot: DeploymentSnapshot = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| ConfigError::parse(format!("JSON parse error: {e}"), location(Some(path))))?
        } else {
            self.parse_snapshot_yaml(&content, Some(path))?
        };

        debug!(
            "Snapshot has {} packages, {} overrides, {} deployments, {} live apps",
            snapshot.packages.len(),
            snapshot.overrides.len(),
            snapshot.deployments.len(),
            snapshot.host.apps.len()
        );
        Ok(snapshot)
    }

    /// Parses a deployment snapshot from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_snapshot_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeploymentSnapshot> {
        let snapshot = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::parse(format!("YAML parse error: {e}"), location(source)))?;
        Ok(snapshot)
    }
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::parse(format!("Failed to read file: {e}"), path.display().to_string())
    })?;
    Ok(content)
}

fn location(source: Option<&Path>) -> String {
    source.map_or_else(|| String::from("<inline>"), |p| p.display().to_string())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

/// Default settings file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["forklift.yaml", "forklift.yml"];

/// Finds the settings file in the given directory or its parents.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
