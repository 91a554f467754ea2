//! Workflow registry.
//!
//! Compiles `WorkflowDefinition`s into immutable `Workflow`s once at process
//! start. Every cross-reference (stages, transition targets, public/future
//! names) is checked here so that a bad definition fails at startup rather
//! than on first use. The registry is read-only afterwards and can be shared
//! across threads behind an `Arc` without locking.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::domain::errors::{RegistryError, WorkflowError, WorkflowResult};
use crate::domain::models::config::Config;
use crate::domain::models::definition::{
    DefinitionsFile, PhaseDefinition, WorkflowDefinition, ORG_SHORT_NAME_PLACEHOLDER,
};
use crate::domain::models::phase::{Phase, Stage, Transition};
use crate::domain::models::role::RoleSet;
use crate::domain::models::workflow::Workflow;
use crate::services::action_mapping::{self, ActionMapping};
use crate::services::catalog;
use crate::services::status_tables::StatusTables;

/// Options applied while compiling definitions.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Substituted for `{org_short_name}` in display strings.
    pub org_short_name: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            org_short_name: Config::default().org_short_name,
        }
    }
}

/// The fixed catalog of workflows, keyed by admin name.
#[derive(Debug)]
pub struct Registry {
    workflows: Vec<Workflow>,
    index: HashMap<String, usize>,
    stage_change_actions: Vec<String>,
    tables: StatusTables,
}

impl Registry {
    /// Compile and validate `definitions`, in order.
    #[instrument(skip_all, fields(count = definitions.len()))]
    pub fn build(
        definitions: Vec<WorkflowDefinition>,
        options: &RegistryOptions,
    ) -> Result<Self, RegistryError> {
        let mut workflows = Vec::with_capacity(definitions.len());
        let mut index = HashMap::new();

        for definition in definitions {
            if definition.admin_name.is_empty() {
                return Err(RegistryError::EmptyAdminName);
            }
            if index.contains_key(&definition.admin_name) {
                return Err(RegistryError::DuplicateWorkflow(definition.admin_name));
            }
            let workflow = compile(definition, options)?;
            debug!(
                workflow = %workflow.admin_name(),
                phases = workflow.phases().len(),
                stages = workflow.stages().len(),
                "compiled workflow"
            );
            index.insert(workflow.admin_name().to_string(), workflows.len());
            workflows.push(workflow);
        }

        let stage_change_actions = stage_change_actions(&workflows);
        let tables = StatusTables::compute(&workflows);

        info!(
            workflows = workflows.len(),
            stage_change_actions = ?stage_change_actions,
            "workflow registry built"
        );

        Ok(Self {
            workflows,
            index,
            stage_change_actions,
            tables,
        })
    }

    /// The four built-in workflows.
    pub fn builtin(options: &RegistryOptions) -> Result<Self, RegistryError> {
        Self::build(catalog::builtin_definitions(), options)
    }

    /// Build from configuration: built-ins plus the optional definitions
    /// file, restricted to (and ordered by) `workflows.enabled`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut available = catalog::builtin_definitions();
        if let Some(path) = &config.workflows.definitions_file {
            let extra = load_definitions(path)?;
            let mut seen = HashSet::new();
            if let Some(dup) = extra.iter().find(|d| !seen.insert(d.admin_name.as_str())) {
                return Err(RegistryError::DuplicateWorkflow(dup.admin_name.clone()))
                    .with_context(|| format!("Duplicate workflow in {path}"));
            }
            for def in extra {
                available.retain(|d| d.admin_name != def.admin_name);
                available.push(def);
            }
        }

        let mut selected = Vec::with_capacity(config.workflows.enabled.len());
        for name in &config.workflows.enabled {
            let position = available
                .iter()
                .position(|d| &d.admin_name == name)
                .ok_or_else(|| RegistryError::UnknownWorkflow(name.clone()))?;
            selected.push(available.swap_remove(position));
        }

        let options = RegistryOptions {
            org_short_name: config.org_short_name.clone(),
        };
        Self::build(selected, &options).context("Failed to build workflow registry")
    }

    /// Convenience for sharing across request handlers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Workflows in registry order.
    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn get(&self, admin_name: &str) -> Option<&Workflow> {
        self.index.get(admin_name).map(|&i| &self.workflows[i])
    }

    pub fn workflow(&self, admin_name: &str) -> WorkflowResult<&Workflow> {
        self.get(admin_name)
            .ok_or_else(|| WorkflowError::UnknownWorkflow(admin_name.to_string()))
    }

    /// Resolve `status` to a phase of the named workflow.
    pub fn phase(&self, workflow: &str, status: &str) -> WorkflowResult<&Phase> {
        self.workflow(workflow)?
            .phase(status)
            .ok_or_else(|| WorkflowError::UnknownPhase {
                workflow: workflow.to_string(),
                status: status.to_string(),
            })
    }

    /// Actions that move a submission into a new stage, in the order
    /// auto-progression attempts them.
    pub fn stage_change_actions(&self) -> &[String] {
        &self.stage_change_actions
    }

    /// Precomputed dashboard/filter lookup tables.
    pub fn status_tables(&self) -> &StatusTables {
        &self.tables
    }

    /// Slug-keyed action labels across one workflow, or all of them.
    pub fn action_mapping(&self, workflow: Option<&Workflow>) -> ActionMapping {
        match workflow {
            Some(workflow) => action_mapping::build(std::slice::from_ref(workflow)),
            None => action_mapping::build(&self.workflows),
        }
    }

    /// Statuses of active phases `roles` may review.
    pub fn review_active_statuses_for(&self, roles: &RoleSet) -> Vec<String> {
        self.statuses_matching(roles, |tables, name| tables.active_statuses.iter().any(|s| s == name))
    }

    /// Review statuses `roles` may review.
    pub fn review_statuses_for(&self, roles: &RoleSet) -> Vec<String> {
        self.statuses_matching(roles, |tables, name| tables.review_statuses.iter().any(|s| s == name))
    }

    fn statuses_matching(
        &self,
        roles: &RoleSet,
        include: impl Fn(&StatusTables, &str) -> bool,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut statuses = Vec::new();
        for phase in self.workflows.iter().flat_map(Workflow::phases) {
            if include(&self.tables, phase.name())
                && phase.permissions().can_review(roles)
                && seen.insert(phase.name())
            {
                statuses.push(phase.name().to_string());
            }
        }
        statuses
    }

    /// Every precondition name referenced by a transition.
    pub fn referenced_preconditions(&self) -> impl Iterator<Item = (&Workflow, &Phase, &Transition, &str)> {
        self.transitions()
            .flat_map(|(w, p, t)| t.preconditions.iter().map(move |name| (w, p, t, name.as_str())))
    }

    /// Every side-effect name referenced by a transition.
    pub fn referenced_side_effects(&self) -> impl Iterator<Item = (&Workflow, &Phase, &Transition, &str)> {
        self.transitions()
            .filter_map(|(w, p, t)| t.side_effect.as_deref().map(|name| (w, p, t, name)))
    }

    fn transitions(&self) -> impl Iterator<Item = (&Workflow, &Phase, &Transition)> {
        self.workflows.iter().flat_map(|w| {
            w.phases()
                .iter()
                .flat_map(move |p| p.transitions().iter().map(move |t| (w, p, t)))
        })
    }
}

/// Load extra definitions from a YAML file.
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<WorkflowDefinition>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow definitions from {}", path.display()))?;
    let file: DefinitionsFile = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse workflow definitions in {}", path.display()))?;
    Ok(file.workflows)
}

fn substitute(text: &str, options: &RegistryOptions) -> String {
    text.replace(ORG_SHORT_NAME_PLACEHOLDER, &options.org_short_name)
}

fn compile(definition: WorkflowDefinition, options: &RegistryOptions) -> Result<Workflow, RegistryError> {
    let workflow_name = definition.admin_name.clone();

    let mut stages: HashMap<&str, Arc<Stage>> = HashMap::new();
    for stage in &definition.stages {
        let compiled = Arc::new(Stage::new(stage.name.clone(), stage.has_external_review));
        if stages.insert(stage.name.as_str(), compiled).is_some() {
            return Err(RegistryError::DuplicateStage {
                workflow: workflow_name,
                stage: stage.name.clone(),
            });
        }
    }

    let mut names = HashSet::new();
    for (_, phase) in definition.phases() {
        if !names.insert(phase.name.as_str()) {
            return Err(RegistryError::DuplicatePhase {
                workflow: workflow_name,
                phase: phase.name.clone(),
            });
        }
    }
    if names.is_empty() {
        return Err(RegistryError::EmptyWorkflow(workflow_name));
    }

    let mut phases = Vec::with_capacity(names.len());
    for (step, phase) in definition.phases() {
        let stage = stages
            .get(phase.stage.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::UnknownStage {
                workflow: workflow_name.clone(),
                phase: phase.name.clone(),
                stage: phase.stage.clone(),
            })?;
        phases.push(compile_phase(&workflow_name, phase, step, stage, &names, options)?);
    }

    Ok(Workflow::new(
        substitute(&definition.name, options),
        definition.admin_name,
        phases,
    ))
}

fn compile_phase(
    workflow: &str,
    phase: &PhaseDefinition,
    step: u32,
    stage: Arc<Stage>,
    names: &HashSet<&str>,
    options: &RegistryOptions,
) -> Result<Phase, RegistryError> {
    if phase.public.is_some() && phase.future.is_some() {
        return Err(RegistryError::ConflictingNames {
            workflow: workflow.to_string(),
            phase: phase.name.clone(),
        });
    }

    let mut transitions: Vec<Transition> = Vec::with_capacity(phase.transitions.len());
    for t in &phase.transitions {
        if !names.contains(t.target.as_str()) {
            return Err(RegistryError::DanglingTransition {
                workflow: workflow.to_string(),
                phase: phase.name.clone(),
                target: t.target.clone(),
            });
        }
        if transitions.iter().any(|existing| existing.target == t.target) {
            return Err(RegistryError::DuplicateTransition {
                workflow: workflow.to_string(),
                phase: phase.name.clone(),
                target: t.target.clone(),
            });
        }
        transitions.push(Transition {
            target: t.target.clone(),
            display: substitute(&t.display, options),
            allowed_roles: t.roles.clone().unwrap_or_else(RoleSet::staff_lead_admin),
            preconditions: t.preconditions.clone(),
            side_effect: t.side_effect.clone(),
        });
    }

    let display_name = substitute(&phase.display, options);
    let public_name = phase
        .public
        .as_deref()
        .map_or_else(|| display_name.clone(), |p| substitute(p, options));
    let future = phase.future.as_deref().map(|f| substitute(f, options));

    Ok(Phase {
        name: phase.name.clone(),
        future_name_staff: future.clone().unwrap_or_else(|| display_name.clone()),
        future_name_public: future.unwrap_or_else(|| public_name.clone()),
        display_name,
        public_name,
        stage,
        permissions: phase.permissions.resolve(),
        step,
        transitions,
    })
}

/// Phases entered by crossing a stage boundary, in first-seen order across
/// all workflows.
fn stage_change_actions(workflows: &[Workflow]) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    for workflow in workflows {
        let mut previous: Option<&Stage> = None;
        for phase in workflow.phases() {
            if let Some(stage) = previous {
                if stage != phase.stage() && !actions.iter().any(|a| a == phase.name()) {
                    actions.push(phase.name().to_string());
                }
            }
            previous = Some(phase.stage());
        }
    }
    actions
}
