//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::models::role::Role;

#[derive(Parser, Debug)]
#[command(name = "grantflow")]
#[command(about = "Grantflow - inspect and simulate grant application workflows", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .grantflow/config.yaml + local.yaml + env)
    #[arg(short, long, global = true, env = "GRANTFLOW_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered workflows
    Workflows,

    /// Show the phases of a workflow
    Phases {
        /// Workflow admin name (e.g. "single", "double")
        workflow: String,

        /// Only phases visible to these roles (comma-separated)
        #[arg(short, long, value_delimiter = ',', value_parser = parse_role)]
        role: Vec<Role>,
    },

    /// List the actions available from a status
    Actions {
        workflow: String,
        status: String,

        /// Roles held by the acting user (comma-separated)
        #[arg(short, long, value_delimiter = ',', value_parser = parse_role, required = true)]
        role: Vec<Role>,

        /// Treat the submission as already progressed to its next stage
        #[arg(long)]
        progressed: bool,
    },

    /// Simulate a transition, including auto-progression
    Transition {
        workflow: String,
        status: String,
        action: String,

        /// Roles held by the acting user (comma-separated)
        #[arg(short, long, value_delimiter = ',', value_parser = parse_role, required = true)]
        role: Vec<Role>,

        /// Treat the submission as already progressed to its next stage
        #[arg(long)]
        progressed: bool,
    },

    /// Show bulk actions keyed by label slug
    Mapping {
        /// Restrict to one workflow
        #[arg(short, long)]
        workflow: Option<String>,
    },

    /// Show status buckets and status lists
    Buckets,

    /// Validate a workflow definitions file (or the configured workflows)
    Check {
        /// YAML definitions file
        file: Option<PathBuf>,
    },
}

/// Parse a role name for clap.
pub fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).ok_or_else(|| {
        let valid: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        format!("unknown role '{s}' (expected one of: {})", valid.join(", "))
    })
}
