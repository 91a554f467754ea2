//! `check` command: validate workflow definitions without running anything.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{action_failure, action_success, output, CommandOutput};
use crate::domain::models::config::Config;
use crate::services::catalog;
use crate::services::registry::{load_definitions, Registry, RegistryOptions};

#[derive(Debug, Serialize)]
struct CheckOutput {
    source: String,
    workflows: Vec<String>,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        match &self.error {
            None => action_success(&format!(
                "{}: {} workflow(s) valid ({})",
                self.source,
                self.workflows.len(),
                self.workflows.join(", ")
            )),
            Some(err) => action_failure(&format!("{}: {err}", self.source)),
        }
    }
}

/// Validate `file` on its own, or the configured registry when no file is
/// given. Invalid definitions are reported, then turned into an error so the
/// exit status reflects them.
pub fn execute(config: &Config, file: Option<&Path>, json_mode: bool) -> Result<()> {
    let out = check(config, file);
    output(&out, json_mode);
    match out.error {
        Some(err) => anyhow::bail!("{}: {err}", out.source),
        None => Ok(()),
    }
}

fn check(config: &Config, file: Option<&Path>) -> CheckOutput {
    let (source, result) = match file {
        Some(path) => {
            let options = RegistryOptions {
                org_short_name: config.org_short_name.clone(),
            };
            let result = load_definitions(path)
                .and_then(|defs| Registry::build(defs, &options).map_err(anyhow::Error::from));
            (path.display().to_string(), result)
        }
        None => ("configuration".to_string(), Registry::from_config(config)),
    };

    let checked = result.map(|registry| {
        let unknown: Vec<&str> = registry
            .referenced_preconditions()
            .map(|(_, _, _, name)| name)
            .filter(|name| !catalog::BUILTIN_PRECONDITIONS.contains(name))
            .chain(
                registry
                    .referenced_side_effects()
                    .map(|(_, _, _, name)| name)
                    .filter(|name| !catalog::BUILTIN_SIDE_EFFECTS.contains(name)),
            )
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(hooks = ?unknown, "Definitions reference hooks the host must register");
        }
        registry
            .workflows()
            .iter()
            .map(|wf| wf.admin_name().to_string())
            .collect::<Vec<_>>()
    });

    match checked {
        Ok(workflows) => CheckOutput {
            source,
            workflows,
            valid: true,
            error: None,
        },
        Err(err) => CheckOutput {
            source,
            workflows: Vec::new(),
            valid: false,
            error: Some(format!("{err:#}")),
        },
    }
}
