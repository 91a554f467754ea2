//! An in-memory submission for simulating transitions from the command line.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::role::RoleSet;
use crate::domain::ports::Submission;
use crate::services::catalog::{CREATE_REVISION, NOT_PROGRESSED, PROGRESS_APPLICATION};
use crate::services::hook_registry::HookRegistry;
use crate::services::registry::Registry;
use crate::services::transition_engine::TransitionEngine;

/// A submission that exists only for the duration of one command.
#[derive(Debug, Clone)]
pub struct SimulatedSubmission {
    pub workflow: String,
    pub status: String,
    /// Whether the next-stage submission already exists.
    pub progressed: bool,
    /// Revisions snapshotted by `create_revision`.
    pub revisions: u32,
    /// Hooks run during the simulation, in order.
    pub hooks_run: Vec<String>,
}

impl SimulatedSubmission {
    pub fn new(workflow: impl Into<String>, status: impl Into<String>, progressed: bool) -> Self {
        Self {
            workflow: workflow.into(),
            status: status.into(),
            progressed,
            revisions: 0,
            hooks_run: Vec::new(),
        }
    }
}

impl Submission for SimulatedSubmission {
    /// The simulated user is just the roles they hold.
    type User = RoleSet;

    fn workflow_name(&self) -> &str {
        &self.workflow
    }

    fn status(&self) -> &str {
        &self.status
    }
}

/// Hooks for simulation: the built-in names behave like the real ones, any
/// other referenced precondition passes and any other side effect only
/// records that it ran.
pub fn simulation_hooks(registry: &Registry) -> HookRegistry<SimulatedSubmission> {
    let mut hooks = HookRegistry::new();
    hooks
        .register_precondition(NOT_PROGRESSED, |s: &SimulatedSubmission| !s.progressed)
        .register_side_effect(CREATE_REVISION, |s: &mut SimulatedSubmission, _: &RoleSet| {
            s.revisions += 1;
            s.hooks_run.push(CREATE_REVISION.to_string());
            Ok(())
        })
        .register_side_effect(PROGRESS_APPLICATION, |s: &mut SimulatedSubmission, _: &RoleSet| {
            s.progressed = true;
            s.hooks_run.push(PROGRESS_APPLICATION.to_string());
            Ok(())
        });

    let preconditions: BTreeSet<&str> = registry
        .referenced_preconditions()
        .map(|(_, _, _, name)| name)
        .collect();
    for name in preconditions {
        if !hooks.has_precondition(name) {
            hooks.register_precondition(name, |_: &SimulatedSubmission| true);
        }
    }

    let side_effects: BTreeSet<&str> = registry
        .referenced_side_effects()
        .map(|(_, _, _, name)| name)
        .collect();
    for name in side_effects {
        if !hooks.has_side_effect(name) {
            let recorded = name.to_string();
            hooks.register_side_effect(name, move |s: &mut SimulatedSubmission, _: &RoleSet| {
                s.hooks_run.push(recorded.clone());
                Ok(())
            });
        }
    }

    hooks
}

/// A transition engine over `registry` for simulated submissions.
pub fn simulation_engine(registry: Arc<Registry>) -> Result<TransitionEngine<SimulatedSubmission>> {
    let hooks = simulation_hooks(&registry);
    let engine = TransitionEngine::new(registry, hooks, |user: &RoleSet, _: &SimulatedSubmission| {
        user.clone()
    })?;
    Ok(engine)
}
