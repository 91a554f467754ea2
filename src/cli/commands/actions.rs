//! `actions` and `transition` commands.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::output::{action_failure, action_success, list_table, output, render_list, CommandOutput};
use crate::cli::simulation::{simulation_engine, SimulatedSubmission};
use crate::domain::models::role::{Role, RoleSet};
use crate::services::registry::Registry;

#[derive(Debug, Serialize)]
struct ActionEntry {
    action: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct ActionListOutput {
    workflow: String,
    status: String,
    roles: RoleSet,
    actions: Vec<ActionEntry>,
}

impl CommandOutput for ActionListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Action", "Label"]);
        for entry in &self.actions {
            table.add_row(vec![Cell::new(&entry.action), Cell::new(&entry.label)]);
        }
        format!(
            "{} / {} as {}\n{}",
            self.workflow,
            self.status,
            self.roles,
            render_list("action", &table, self.actions.len())
        )
    }
}

#[derive(Debug, Serialize)]
struct TransitionOutput {
    workflow: String,
    action: String,
    previous: String,
    status: String,
    auto_progressed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    halted: Option<String>,
    hooks_run: Vec<String>,
}

impl CommandOutput for TransitionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![action_success(&format!(
            "{}: {} → {} via '{}'",
            self.workflow, self.previous, self.status, self.action
        ))];
        if !self.auto_progressed.is_empty() {
            lines.push(format!("  Auto-progressed: {}", self.auto_progressed.join(" → ")));
        }
        if !self.hooks_run.is_empty() {
            lines.push(format!("  Hooks run: {}", self.hooks_run.join(", ")));
        }
        if let Some(reason) = &self.halted {
            lines.push(action_failure(&format!("Auto-progression halted: {reason}")));
        }
        lines.join("\n")
    }
}

pub fn list_actions(
    registry: Arc<Registry>,
    workflow: &str,
    status: &str,
    roles: &[Role],
    progressed: bool,
    json_mode: bool,
) -> Result<()> {
    output(&action_list(registry, workflow, status, roles, progressed)?, json_mode);
    Ok(())
}

pub fn simulate_transition(
    registry: Arc<Registry>,
    workflow: &str,
    status: &str,
    action: &str,
    roles: &[Role],
    progressed: bool,
    json_mode: bool,
) -> Result<()> {
    output(
        &transition(registry, workflow, status, action, roles, progressed)?,
        json_mode,
    );
    Ok(())
}

fn action_list(
    registry: Arc<Registry>,
    workflow: &str,
    status: &str,
    roles: &[Role],
    progressed: bool,
) -> Result<ActionListOutput> {
    let engine = simulation_engine(registry)?;
    let submission = SimulatedSubmission::new(workflow, status, progressed);
    let roles: RoleSet = roles.iter().copied().collect();

    let actions = engine
        .actions_for(&submission, &roles)?
        .into_iter()
        .map(|(action, label)| ActionEntry {
            action: action.to_string(),
            label: label.to_string(),
        })
        .collect();

    Ok(ActionListOutput {
        workflow: workflow.to_string(),
        status: status.to_string(),
        roles,
        actions,
    })
}

fn transition(
    registry: Arc<Registry>,
    workflow: &str,
    status: &str,
    action: &str,
    roles: &[Role],
    progressed: bool,
) -> Result<TransitionOutput> {
    let engine = simulation_engine(registry)?;
    let mut submission = SimulatedSubmission::new(workflow, status, progressed);
    let roles: RoleSet = roles.iter().copied().collect();

    let outcome = engine.perform(&mut submission, action, &roles)?;

    Ok(TransitionOutput {
        workflow: workflow.to_string(),
        action: action.to_string(),
        previous: outcome.previous,
        status: outcome.status,
        auto_progressed: outcome.auto_progressed,
        halted: outcome.halted.map(|err| err.to_string()),
        hooks_run: submission.hooks_run,
    })
}
