//! Command implementations.

pub mod actions;
pub mod check;
pub mod mapping;
pub mod workflows;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::models::config::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::services::registry::Registry;

/// Load configuration from `path`, or the project hierarchy when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration")
}

/// Build the registry a command runs against.
pub fn load_registry(config: &Config) -> Result<Arc<Registry>> {
    Ok(Registry::from_config(config)?.into_shared())
}
