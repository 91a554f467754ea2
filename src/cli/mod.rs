//! Command-line interface for inspecting workflows and simulating
//! transitions.

pub mod commands;
pub mod output;
pub mod simulation;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::Result;

use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load configuration, install logging and dispatch `cli.command`.
pub fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
    let json = cli.json;

    if let Commands::Check { file } = &cli.command {
        return commands::check::execute(&config, file.as_deref(), json);
    }

    let registry = commands::load_registry(&config)?;
    match cli.command {
        Commands::Workflows => commands::workflows::list_workflows(&registry, json),
        Commands::Phases { workflow, role } => {
            commands::workflows::show_phases(&registry, &workflow, &role, json)
        }
        Commands::Actions {
            workflow,
            status,
            role,
            progressed,
        } => commands::actions::list_actions(registry, &workflow, &status, &role, progressed, json),
        Commands::Transition {
            workflow,
            status,
            action,
            role,
            progressed,
        } => commands::actions::simulate_transition(
            registry, &workflow, &status, &action, &role, progressed, json,
        ),
        Commands::Mapping { workflow } => {
            commands::mapping::show_mapping(&registry, workflow.as_deref(), json)
        }
        Commands::Buckets => commands::mapping::show_buckets(&registry, json),
        Commands::Check { file } => commands::check::execute(&config, file.as_deref(), json),
    }
}

/// Report `err` and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{}", output::action_failure(&format!("{err:#}")));
    }
    std::process::exit(1);
}
