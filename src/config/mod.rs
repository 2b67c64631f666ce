//! Configuration module for forklift.
//!
//! This module handles all configuration-related functionality:
//! - Parsing `forklift.yaml` settings with environment overrides
//! - Loading deployment snapshots handed over by the package loader
//! - Hashing deployment definitions and plans

mod hash;
mod parser;
mod settings;
mod snapshot;

pub use hash::DefinitionHasher;
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use settings::{ApplyConfig, ForkliftConfig, LoggingConfig};
pub use snapshot::{DeploymentSnapshot, HostSnapshot};
