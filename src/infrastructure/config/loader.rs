use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project configuration, relative to the project root.
pub const CONFIG_DIR: &str = ".grantflow";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("org_short_name cannot be empty")]
    EmptyOrgShortName,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("At least one workflow must be enabled")]
    NoWorkflowsEnabled,

    #[error("Workflow '{0}' is enabled more than once")]
    DuplicateWorkflow(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .grantflow/config.yaml
    /// 3. .grantflow/local.yaml (optional local overrides)
    /// 4. Environment variables (GRANTFLOW_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`Self::load`] with `root` as the project root.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("GRANTFLOW_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.org_short_name.trim().is_empty() {
            return Err(ConfigError::EmptyOrgShortName);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.workflows.enabled.is_empty() {
            return Err(ConfigError::NoWorkflowsEnabled);
        }

        let mut seen = HashSet::new();
        for name in &config.workflows.enabled {
            if name.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "Enabled workflow name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateWorkflow(name.clone()));
            }
        }

        if config
            .workflows
            .definitions_file
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            return Err(ConfigError::ValidationFailed(
                "workflows.definitions_file cannot be empty when set".to_string(),
            ));
        }

        Ok(())
    }
}
