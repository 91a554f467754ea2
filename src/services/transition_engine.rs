//! Role-gated phase transitions.
//!
//! The `TransitionEngine` lists the actions a user may take on a submission
//! and performs them: permission check, preconditions, side-effect hook, new
//! status. After a successful transition it tries the registry's stage-change
//! actions so that a submission invited to the next stage moves there in the
//! same call.
//!
//! The engine never stores the status. Callers persist
//! `TransitionOutcome::status` themselves.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{RegistryError, WorkflowError, WorkflowResult};
use crate::domain::models::role::RoleSet;
use crate::domain::models::workflow::Workflow;
use crate::domain::ports::{RoleResolver, Submission};
use crate::services::hook_registry::HookRegistry;
use crate::services::registry::Registry;

/// Result of `perform_transition`.
#[derive(Debug)]
pub struct TransitionOutcome {
    /// Status before the call.
    pub previous: String,
    /// Status after the requested transition and any auto-progression.
    pub status: String,
    /// Statuses reached through auto-progression, in order.
    pub auto_progressed: Vec<String>,
    /// Why auto-progression stopped early, if an eligible stage-change
    /// action failed its precondition or hook.
    pub halted: Option<WorkflowError>,
}

impl TransitionOutcome {
    pub fn auto_progressed(&self) -> bool {
        !self.auto_progressed.is_empty()
    }
}

/// Executes transitions for one submission type.
pub struct TransitionEngine<S: Submission> {
    registry: Arc<Registry>,
    hooks: HookRegistry<S>,
    resolver: Arc<dyn RoleResolver<S>>,
}

impl<S: Submission> TransitionEngine<S> {
    /// Build an engine, checking that every hook the registry names is
    /// registered.
    pub fn new(
        registry: Arc<Registry>,
        hooks: HookRegistry<S>,
        resolver: impl RoleResolver<S> + 'static,
    ) -> Result<Self, RegistryError> {
        hooks.validate(&registry)?;
        debug!(?hooks, "Transition engine ready");
        Ok(Self {
            registry,
            hooks,
            resolver: Arc::new(resolver),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn hooks(&self) -> &HookRegistry<S> {
        &self.hooks
    }

    /// Roles `user` holds on `submission`.
    pub fn roles(&self, user: &S::User, submission: &S) -> RoleSet {
        self.resolver.roles(user, submission)
    }

    /// `(action, label)` pairs available to `user` from `status`, in
    /// declaration order.
    #[instrument(skip(self, user, submission))]
    pub fn actions_for_user(
        &self,
        workflow: &str,
        status: &str,
        user: &S::User,
        submission: &S,
    ) -> WorkflowResult<Vec<(&str, &str)>> {
        let phase = self.registry.phase(workflow, status)?;
        let roles = self.roles(user, submission);
        Ok(phase.transitions_for(&roles, |name| self.hooks.check(name, submission)))
    }

    /// Actions available on `submission` from its current status.
    pub fn actions_for(&self, submission: &S, user: &S::User) -> WorkflowResult<Vec<(&str, &str)>> {
        self.actions_for_user(submission.workflow_name(), submission.status(), user, submission)
    }

    /// Perform a single transition without auto-progression and return the
    /// new status.
    #[instrument(skip(self, user, submission))]
    pub fn apply_transition(
        &self,
        workflow: &str,
        status: &str,
        action: &str,
        user: &S::User,
        submission: &mut S,
    ) -> WorkflowResult<String> {
        let workflow = self.registry.workflow(workflow)?;
        self.step(workflow, status, action, user, submission)
    }

    /// Perform `action`, then auto-progress across stage boundaries.
    #[instrument(skip(self, user, submission))]
    pub fn perform_transition(
        &self,
        workflow: &str,
        status: &str,
        action: &str,
        user: &S::User,
        submission: &mut S,
    ) -> WorkflowResult<TransitionOutcome> {
        let workflow = self.registry.workflow(workflow)?;
        let next = self.step(workflow, status, action, user, submission)?;
        let (status_after, auto_progressed, halted) =
            self.progress_stage_when_possible(workflow, next, user, submission);

        Ok(TransitionOutcome {
            previous: status.to_string(),
            status: status_after,
            auto_progressed,
            halted,
        })
    }

    /// `perform_transition` using the submission's own workflow and status.
    pub fn perform(
        &self,
        submission: &mut S,
        action: &str,
        user: &S::User,
    ) -> WorkflowResult<TransitionOutcome> {
        let workflow = submission.workflow_name().to_string();
        let status = submission.status().to_string();
        self.perform_transition(&workflow, &status, action, user, submission)
    }

    fn step(
        &self,
        workflow: &Workflow,
        status: &str,
        action: &str,
        user: &S::User,
        submission: &mut S,
    ) -> WorkflowResult<String> {
        let phase = workflow.phase(status).ok_or_else(|| WorkflowError::UnknownPhase {
            workflow: workflow.admin_name().to_string(),
            status: status.to_string(),
        })?;

        let transition = phase
            .transition(action)
            .ok_or_else(|| WorkflowError::NoSuchTransition {
                status: status.to_string(),
                action: action.to_string(),
            })?;

        let roles = self.roles(user, submission);
        if !transition.permits(&roles) {
            return Err(WorkflowError::PermissionDenied {
                action: action.to_string(),
            });
        }

        if let Some(failed) = transition
            .preconditions
            .iter()
            .find(|name| !self.hooks.check(name, submission))
        {
            return Err(WorkflowError::PreconditionFailed(failed.clone()));
        }

        if let Some(effect) = &transition.side_effect {
            self.hooks.run(effect, submission, user)?;
        }

        debug!(
            workflow = %workflow.admin_name(),
            from = %status,
            to = %transition.target,
            %roles,
            "Transition applied"
        );
        Ok(transition.target.clone())
    }

    /// Try stage-change actions from `status` until none applies.
    ///
    /// Runs at most one round per stage of the workflow. Ineligible actions
    /// are skipped; any other failure stops the loop and is handed back.
    fn progress_stage_when_possible(
        &self,
        workflow: &Workflow,
        mut status: String,
        user: &S::User,
        submission: &mut S,
    ) -> (String, Vec<String>, Option<WorkflowError>) {
        let mut reached = Vec::new();

        for _ in 0..workflow.stages().len() {
            let mut advanced = false;
            for action in self.registry.stage_change_actions() {
                match self.step(workflow, &status, action, user, submission) {
                    Ok(next) => {
                        info!(
                            workflow = %workflow.admin_name(),
                            from = %status,
                            to = %next,
                            "Auto-progressed to next stage"
                        );
                        reached.push(next.clone());
                        status = next;
                        advanced = true;
                        break;
                    }
                    Err(err) if err.is_not_applicable() => {}
                    Err(err) => {
                        warn!(
                            workflow = %workflow.admin_name(),
                            status = %status,
                            action = %action,
                            error = %err,
                            "Auto-progression halted"
                        );
                        return (status, reached, Some(err));
                    }
                }
            }
            if !advanced {
                break;
            }
        }

        (status, reached, None)
    }
}

impl<S: Submission> std::fmt::Debug for TransitionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("workflows", &self.registry.workflows().len())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::definition::{
        PhaseDefinition, StageDefinition, TransitionDefinition, WorkflowDefinition,
    };
    use crate::domain::models::permissions::PermissionPreset;
    use crate::domain::models::role::Role;
    use crate::services::catalog::{CREATE_REVISION, NOT_PROGRESSED, PROGRESS_APPLICATION};
    use crate::services::registry::RegistryOptions;

    struct App {
        workflow: &'static str,
        status: String,
        owner: u32,
        progressed: bool,
    }

    impl Submission for App {
        type User = (u32, Role);

        fn workflow_name(&self) -> &str {
            self.workflow
        }

        fn status(&self) -> &str {
            &self.status
        }
    }

    fn engine() -> TransitionEngine<App> {
        let registry = Registry::builtin(&RegistryOptions::default()).unwrap();
        let hooks = HookRegistry::new()
            .with_precondition(NOT_PROGRESSED, |app: &App| !app.progressed)
            .with_side_effect(CREATE_REVISION, |_: &mut App, _: &(u32, Role)| Ok(()))
            .with_side_effect(PROGRESS_APPLICATION, |app: &mut App, _: &(u32, Role)| {
                app.progressed = true;
                Ok(())
            });
        let resolver = |user: &(u32, Role), app: &App| {
            let mut roles = RoleSet::from([user.1]);
            if user.1 == Role::Applicant && user.0 != app.owner {
                roles = RoleSet::new();
            }
            roles
        };
        TransitionEngine::new(registry.into_shared(), hooks, resolver).unwrap()
    }

    fn app(workflow: &'static str, status: &str) -> App {
        App {
            workflow,
            status: status.to_string(),
            owner: 7,
            progressed: false,
        }
    }

    #[test]
    fn test_new_rejects_missing_hooks() {
        let registry = Registry::builtin(&RegistryOptions::default()).unwrap();
        let err = TransitionEngine::<App>::new(
            registry.into_shared(),
            HookRegistry::new(),
            |_: &(u32, Role), _: &App| RoleSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownPrecondition { .. }));
    }

    #[test]
    fn test_actions_for_applicant_owner_only() {
        let engine = engine();
        let draft = app("single", "draft");
        assert_eq!(
            engine.actions_for(&draft, &(7, Role::Applicant)).unwrap(),
            vec![("in_discussion", "Submit")]
        );
        assert!(engine.actions_for(&draft, &(8, Role::Applicant)).unwrap().is_empty());
        assert!(engine.actions_for(&draft, &(1, Role::Staff)).unwrap().is_empty());
    }

    #[test]
    fn test_apply_transition_is_single_step() {
        let engine = engine();
        let mut submission = app("double", "concept_determination");
        let next = engine
            .apply_transition(
                "double",
                "concept_determination",
                "invited_to_proposal",
                &(1, Role::Staff),
                &mut submission,
            )
            .unwrap();
        assert_eq!(next, "invited_to_proposal");
        assert!(!submission.progressed);
    }

    #[test]
    fn test_perform_auto_progresses() {
        let engine = engine();
        let mut submission = app("double", "concept_determination");
        let outcome = engine
            .perform(&mut submission, "invited_to_proposal", &(1, Role::Staff))
            .unwrap();
        assert_eq!(outcome.previous, "concept_determination");
        assert_eq!(outcome.status, "draft_proposal");
        assert_eq!(outcome.auto_progressed, vec!["draft_proposal".to_string()]);
        assert!(outcome.halted.is_none());
        assert!(submission.progressed);
    }

    #[test]
    fn test_unknown_workflow_and_phase() {
        let engine = engine();
        let mut submission = app("triple", "draft");
        assert!(matches!(
            engine.perform(&mut submission, "in_discussion", &(7, Role::Applicant)),
            Err(WorkflowError::UnknownWorkflow(_))
        ));

        let mut submission = app("single", "limbo");
        assert!(matches!(
            engine.perform(&mut submission, "in_discussion", &(7, Role::Applicant)),
            Err(WorkflowError::UnknownPhase { .. })
        ));
    }

    fn custom_engine(
        stages: &[&str],
        steps: Vec<PhaseDefinition>,
        hooks: HookRegistry<App>,
    ) -> TransitionEngine<App> {
        let definition = WorkflowDefinition {
            name: "Custom".to_string(),
            admin_name: "custom".to_string(),
            stages: stages
                .iter()
                .map(|name| StageDefinition {
                    name: (*name).to_string(),
                    has_external_review: false,
                })
                .collect(),
            steps: steps.into_iter().map(|phase| vec![phase]).collect(),
        };
        let registry = Registry::build(vec![definition], &RegistryOptions::default()).unwrap();
        let resolver = |user: &(u32, Role), _: &App| RoleSet::from([user.1]);
        TransitionEngine::new(registry.into_shared(), hooks, resolver).unwrap()
    }

    fn custom_phase(name: &str, stage: &str) -> PhaseDefinition {
        PhaseDefinition::new(name, name, stage, PermissionPreset::Default)
    }

    #[test]
    fn test_auto_progression_crosses_several_stages() {
        let engine = custom_engine(
            &["A", "B", "C"],
            vec![
                custom_phase("a0", "A").to("a1", "Next"),
                custom_phase("a1", "A").to("b0", "Advance"),
                custom_phase("b0", "B").to("c0", "Advance"),
                custom_phase("c0", "C"),
            ],
            HookRegistry::new(),
        );
        assert_eq!(engine.registry().stage_change_actions(), ["b0", "c0"]);

        let mut submission = app("custom", "a0");
        let outcome = engine.perform(&mut submission, "a1", &(1, Role::Staff)).unwrap();
        assert_eq!(outcome.status, "c0");
        assert_eq!(outcome.auto_progressed, vec!["b0".to_string(), "c0".to_string()]);
        assert!(outcome.halted.is_none());
    }

    #[test]
    fn test_auto_progression_cycle_stops_after_one_round_per_stage() {
        let engine = custom_engine(
            &["A", "B"],
            vec![
                custom_phase("a0", "A").to("b0", "Advance"),
                custom_phase("b0", "B").to("a1", "Back"),
                custom_phase("a1", "A").to("b0", "Advance"),
            ],
            HookRegistry::new(),
        );
        assert_eq!(engine.registry().stage_change_actions(), ["b0", "a1"]);
        let rounds = engine.registry().workflow("custom").unwrap().stages().len();

        let mut submission = app("custom", "a0");
        let outcome = engine.perform(&mut submission, "b0", &(1, Role::Staff)).unwrap();
        assert_eq!(outcome.auto_progressed.len(), rounds);
        assert_eq!(outcome.auto_progressed, vec!["a1".to_string(), "b0".to_string()]);
        assert_eq!(outcome.status, "b0");
        assert!(outcome.halted.is_none());
    }

    #[test]
    fn test_hooks_see_caller_status_during_auto_progression() {
        let engine = custom_engine(
            &["A", "B"],
            vec![
                custom_phase("a0", "A").to("a1", "Next"),
                custom_phase("a1", "A").transition(
                    TransitionDefinition::new("b0", "Advance").precondition("still_a0"),
                ),
                custom_phase("b0", "B"),
            ],
            HookRegistry::new().with_precondition("still_a0", |app: &App| app.status() == "a0"),
        );

        // The submission still reports "a0" while "b0" is tried from "a1".
        let mut submission = app("custom", "a0");
        let outcome = engine.perform(&mut submission, "a1", &(1, Role::Staff)).unwrap();
        assert_eq!(outcome.status, "b0");
        assert_eq!(submission.status(), "a0");
    }
}
