//! Stages, phases and the transitions between phases.
//!
//! These are compiled from `WorkflowDefinition`s by the registry and never
//! change afterwards.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::permissions::PermissionSet;
use super::role::RoleSet;

/// A coarse grouping of phases (e.g. Concept vs. Proposal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Stage {
    pub name: String,
    pub has_external_review: bool,
}

impl Stage {
    pub fn new(name: impl Into<String>, has_external_review: bool) -> Self {
        Self {
            name: name.into(),
            has_external_review,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Who a phase name is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Staff,
    Public,
}

/// A permitted move out of a phase. The action name is the target phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub target: String,
    pub display: String,
    pub allowed_roles: RoleSet,
    /// Precondition names, evaluated left to right.
    pub preconditions: Vec<String>,
    pub side_effect: Option<String>,
}

impl Transition {
    /// Whether a user holding `roles` may attempt this transition.
    pub fn permits(&self, roles: &RoleSet) -> bool {
        self.allowed_roles.intersects(roles)
    }
}

/// A named state of a workflow.
#[derive(Debug, Clone)]
pub struct Phase {
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) public_name: String,
    pub(crate) future_name_staff: String,
    pub(crate) future_name_public: String,
    pub(crate) stage: Arc<Stage>,
    pub(crate) permissions: PermissionSet,
    pub(crate) step: u32,
    pub(crate) transitions: Vec<Transition>,
}

impl Phase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn public_name(&self) -> &str {
        &self.public_name
    }

    pub fn future_name_staff(&self) -> &str {
        &self.future_name_staff
    }

    pub fn future_name_public(&self) -> &str {
        &self.future_name_public
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub(crate) fn stage_arc(&self) -> &Arc<Stage> {
        &self.stage
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Ordinal position; alternate phases at the same boundary share a step.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Outgoing transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The outgoing transition for `action`, if any.
    pub fn transition(&self, action: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.target == action)
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Actions a user holding `roles` can take from this phase.
    ///
    /// `precondition` evaluates a named precondition against the submission
    /// the listing is for.
    pub fn transitions_for<'a>(
        &'a self,
        roles: &RoleSet,
        mut precondition: impl FnMut(&str) -> bool,
    ) -> Vec<(&'a str, &'a str)> {
        self.transitions
            .iter()
            .filter(|t| t.permits(roles))
            .filter(|t| t.preconditions.iter().all(|name| precondition(name.as_str())))
            .map(|t| (t.target.as_str(), t.display.as_str()))
            .collect()
    }

    /// Name of this phase as shown to `audience`.
    ///
    /// Staff always see the display name. The public sees the public name
    /// once the phase has been reached and the future name before that.
    pub fn name_for(&self, audience: Audience, reached: bool) -> &str {
        match audience {
            Audience::Staff => &self.display_name,
            Audience::Public if reached => &self.public_name,
            Audience::Public => &self.future_name_public,
        }
    }
}

impl PartialEq for Phase {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.stage == other.stage && self.step == other.step
    }
}

impl Eq for Phase {}

impl PartialEq<str> for Phase {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
