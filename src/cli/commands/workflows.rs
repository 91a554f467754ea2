//! `workflows` and `phases` commands.

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::role::{Role, RoleSet};
use crate::services::registry::Registry;

#[derive(Debug, Serialize)]
struct WorkflowSummary {
    admin_name: String,
    name: String,
    stages: Vec<String>,
    phase_count: usize,
    has_external_review: bool,
}

#[derive(Debug, Serialize)]
struct WorkflowListOutput {
    workflows: Vec<WorkflowSummary>,
    stage_change_actions: Vec<String>,
}

impl CommandOutput for WorkflowListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Workflow", "Name", "Stages", "Phases", "External review"]);
        for wf in &self.workflows {
            table.add_row(vec![
                Cell::new(&wf.admin_name),
                Cell::new(&wf.name),
                Cell::new(wf.stages.join(" → ")),
                Cell::new(wf.phase_count),
                Cell::new(if wf.has_external_review { "yes" } else { "no" }),
            ]);
        }
        let mut rendered = render_list("workflow", &table, self.workflows.len());
        if !self.stage_change_actions.is_empty() {
            rendered.push_str(&format!(
                "\n\nStage-change actions: {}",
                self.stage_change_actions.join(", ")
            ));
        }
        rendered
    }
}

#[derive(Debug, Serialize)]
struct TransitionDetail {
    action: String,
    label: String,
    roles: RoleSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preconditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side_effect: Option<String>,
}

#[derive(Debug, Serialize)]
struct PhaseDetail {
    step: u32,
    name: String,
    display_name: String,
    public_name: String,
    future_name: String,
    stage: String,
    transitions: Vec<TransitionDetail>,
}

#[derive(Debug, Serialize)]
struct PhaseListOutput {
    workflow: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewer: Option<RoleSet>,
    phases: Vec<PhaseDetail>,
}

impl CommandOutput for PhaseListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Step", "Phase", "Display", "Public", "Stage", "Actions"]);
        for phase in &self.phases {
            let actions: Vec<String> = phase
                .transitions
                .iter()
                .map(|t| format!("{} ({})", t.action, t.label))
                .collect();
            table.add_row(vec![
                Cell::new(phase.step),
                Cell::new(&phase.name),
                Cell::new(&phase.display_name),
                Cell::new(&phase.public_name),
                Cell::new(&phase.stage),
                Cell::new(actions.join("\n")),
            ]);
        }
        let header = match &self.viewer {
            Some(roles) => format!("{} ({}) as seen by {roles}", self.name, self.workflow),
            None => format!("{} ({})", self.name, self.workflow),
        };
        format!("{header}\n{}", render_list("phase", &table, self.phases.len()))
    }
}

pub fn list_workflows(registry: &Registry, json_mode: bool) -> Result<()> {
    output(&workflow_list(registry), json_mode);
    Ok(())
}

pub fn show_phases(registry: &Registry, workflow: &str, roles: &[Role], json_mode: bool) -> Result<()> {
    output(&phase_list(registry, workflow, roles)?, json_mode);
    Ok(())
}

fn workflow_list(registry: &Registry) -> WorkflowListOutput {
    let workflows = registry
        .workflows()
        .iter()
        .map(|wf| WorkflowSummary {
            admin_name: wf.admin_name().to_string(),
            name: wf.name().to_string(),
            stages: wf.stages().iter().map(|s| s.name.clone()).collect(),
            phase_count: wf.phases().len(),
            has_external_review: wf.has_external_review(),
        })
        .collect();

    WorkflowListOutput {
        workflows,
        stage_change_actions: registry.stage_change_actions().to_vec(),
    }
}

fn phase_list(registry: &Registry, workflow: &str, roles: &[Role]) -> Result<PhaseListOutput> {
    let wf = registry.workflow(workflow)?;
    let viewer: Option<RoleSet> = (!roles.is_empty()).then(|| roles.iter().copied().collect());

    // A viewer sees one display phase per step; otherwise list everything.
    let phases = match &viewer {
        Some(roles) => wf.phases_for(Some(roles)),
        None => wf.phases().iter().collect(),
    };

    let phases = phases
        .into_iter()
        .map(|phase| PhaseDetail {
            step: phase.step(),
            name: phase.name().to_string(),
            display_name: phase.display_name().to_string(),
            public_name: phase.public_name().to_string(),
            future_name: phase.future_name_public().to_string(),
            stage: phase.stage().name.clone(),
            transitions: phase
                .transitions()
                .iter()
                .map(|t| TransitionDetail {
                    action: t.target.clone(),
                    label: t.display.clone(),
                    roles: t.allowed_roles.clone(),
                    preconditions: t.preconditions.clone(),
                    side_effect: t.side_effect.clone(),
                })
                .collect(),
        })
        .collect();

    Ok(PhaseListOutput {
        workflow: wf.admin_name().to_string(),
        name: wf.name().to_string(),
        viewer,
        phases,
    })
}
