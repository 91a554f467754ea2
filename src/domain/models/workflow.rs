//! A compiled workflow: the phase graph for one process variant.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::phase::{Phase, Stage};
use super::role::RoleSet;

/// The complete phase/transition graph for one process variant
/// (single-stage, external review, community review, concept/proposal).
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    admin_name: String,
    phases: Vec<Phase>,
    index: HashMap<String, usize>,
    stages: Vec<Arc<Stage>>,
}

impl Workflow {
    /// Assemble a workflow from already-validated phases.
    ///
    /// Phase names must be unique; the registry checks this before calling.
    pub(crate) fn new(name: String, admin_name: String, phases: Vec<Phase>) -> Self {
        let index = phases
            .iter()
            .enumerate()
            .map(|(i, phase)| (phase.name().to_string(), i))
            .collect();

        let mut stages: Vec<Arc<Stage>> = Vec::new();
        for phase in &phases {
            if !stages.iter().any(|s| s.as_ref() == phase.stage()) {
                stages.push(Arc::clone(phase.stage_arc()));
            }
        }

        Self {
            name,
            admin_name,
            phases,
            index,
            stages,
        }
    }

    /// Human-readable name (e.g. "Request").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key (e.g. "single").
    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    /// Phases in declaration order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.index.get(name).map(|&i| &self.phases[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The phase a new submission starts in.
    pub fn first_phase(&self) -> Option<&Phase> {
        self.phases.first()
    }

    /// Distinct stages in first-seen order.
    pub fn stages(&self) -> &[Arc<Stage>] {
        &self.stages
    }

    pub fn stage_index(&self, stage: &Stage) -> Option<usize> {
        self.stages.iter().position(|s| s.as_ref() == stage)
    }

    pub fn has_external_review(&self) -> bool {
        self.stages.iter().any(|s| s.has_external_review)
    }

    /// Phases grouped by step, in step order.
    pub fn stepped_phases(&self) -> BTreeMap<u32, Vec<&Phase>> {
        let mut stepped: BTreeMap<u32, Vec<&Phase>> = BTreeMap::new();
        for phase in &self.phases {
            stepped.entry(phase.step()).or_default().push(phase);
        }
        stepped
    }

    /// The display phase (first of its step group) for `phase`.
    pub fn display_phase<'a>(&'a self, phase: &'a Phase) -> &'a Phase {
        self.phases
            .iter()
            .find(|p| p.step() == phase.step())
            .unwrap_or(phase)
    }

    /// The display phase of each step, restricted to the ones `viewer` may
    /// see. With no viewer every display phase is returned.
    pub fn phases_for(&self, viewer: Option<&RoleSet>) -> Vec<&Phase> {
        self.stepped_phases()
            .into_values()
            .filter_map(|group| group.into_iter().next())
            .filter(|phase| viewer.is_none_or(|roles| phase.permissions().can_view(roles)))
            .collect()
    }

    /// The latest display phase before `current` that `viewer` may see.
    ///
    /// Used when rendering history to applicants so staff-only intermediate
    /// phases are never named.
    pub fn previous_visible(&self, current: &Phase, viewer: &RoleSet) -> Option<&Phase> {
        let display_phase = self.display_phase(current);
        let phases = self.phases_for(None);
        let index = phases.iter().position(|p| p.name() == display_phase.name())?;
        phases[..index]
            .iter()
            .rev()
            .find(|phase| phase.permissions().can_view(viewer))
            .copied()
    }
}

impl PartialEq for Workflow {
    fn eq(&self, other: &Self) -> bool {
        self.admin_name == other.admin_name
    }
}

impl Eq for Workflow {}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
