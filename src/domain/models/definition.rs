//! Authoring shape of a workflow.
//!
//! Definitions are plain data (built in code or loaded from YAML) and are
//! compiled into immutable `Workflow`s by the registry, which is where every
//! cross-reference is checked.

use serde::{Deserialize, Serialize};

use super::permissions::{PermissionPreset, PermissionSet};
use super::role::RoleSet;

/// Placeholder substituted with the configured organisation short name.
pub const ORG_SHORT_NAME_PLACEHOLDER: &str = "{org_short_name}";

/// A stage referenced by name from phase definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    #[serde(default)]
    pub has_external_review: bool,
}

/// Permissions either by preset name or spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionSpec {
    Preset(PermissionPreset),
    Custom(PermissionSet),
}

impl Default for PermissionSpec {
    fn default() -> Self {
        Self::Preset(PermissionPreset::Default)
    }
}

impl PermissionSpec {
    pub fn resolve(&self) -> PermissionSet {
        match self {
            Self::Preset(preset) => preset.permissions(),
            Self::Custom(set) => set.clone(),
        }
    }
}

/// An outgoing edge of a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// Target phase; also the action name.
    pub target: String,
    /// Button label.
    pub display: String,
    /// Roles allowed to take the transition; staff, lead and admin when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preconditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effect: Option<String>,
}

impl TransitionDefinition {
    /// A staff/lead/admin transition with no preconditions or hook.
    pub fn new(target: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            display: display.into(),
            roles: None,
            preconditions: Vec::new(),
            side_effect: None,
        }
    }

    #[must_use]
    pub fn roles(mut self, roles: impl Into<RoleSet>) -> Self {
        self.roles = Some(roles.into());
        self
    }

    #[must_use]
    pub fn precondition(mut self, name: impl Into<String>) -> Self {
        self.preconditions.push(name.into());
        self
    }

    #[must_use]
    pub fn side_effect(mut self, name: impl Into<String>) -> Self {
        self.side_effect = Some(name.into());
        self
    }
}

/// A phase before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    pub display: String,
    /// Name shown to the public; defaults to `display`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    /// Name shown before the phase is reached. Exclusive with `public`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future: Option<String>,
    pub stage: String,
    #[serde(default)]
    pub permissions: PermissionSpec,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

impl PhaseDefinition {
    pub fn new(
        name: impl Into<String>,
        display: impl Into<String>,
        stage: impl Into<String>,
        permissions: PermissionPreset,
    ) -> Self {
        Self {
            name: name.into(),
            display: display.into(),
            public: None,
            future: None,
            stage: stage.into(),
            permissions: PermissionSpec::Preset(permissions),
            transitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn public(mut self, public: impl Into<String>) -> Self {
        self.public = Some(public.into());
        self
    }

    #[must_use]
    pub fn future(mut self, future: impl Into<String>) -> Self {
        self.future = Some(future.into());
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: TransitionDefinition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Shorthand for a default-role transition.
    #[must_use]
    pub fn to(self, target: &str, display: &str) -> Self {
        self.transition(TransitionDefinition::new(target, display))
    }
}

/// A workflow before compilation. Each entry of `steps` is one step; phases
/// within a step are alternates at the same boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub admin_name: String,
    pub stages: Vec<StageDefinition>,
    pub steps: Vec<Vec<PhaseDefinition>>,
}

impl WorkflowDefinition {
    /// Phases with their step index, in declaration order.
    pub fn phases(&self) -> impl Iterator<Item = (u32, &PhaseDefinition)> {
        self.steps.iter().enumerate().flat_map(|(step, phases)| {
            let step = u32::try_from(step).unwrap_or(u32::MAX);
            phases.iter().map(move |phase| (step, phase))
        })
    }
}

/// A file of workflow definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionsFile {
    #[serde(default)]
    pub workflows: Vec<WorkflowDefinition>,
}
