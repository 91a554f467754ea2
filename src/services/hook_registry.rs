//! Hook Registry Service
//!
//! Named preconditions and side effects supplied by the host application.
//! Workflow definitions refer to hooks by name only; the transition engine
//! checks every referenced name against this registry when it is built.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::{RegistryError, WorkflowError, WorkflowResult};
use crate::domain::ports::Submission;
use crate::services::registry::Registry;

/// A pure check against the submission.
pub type Precondition<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Runs after the guards pass and before the new status is returned. An error
/// aborts the transition.
pub type SideEffect<S> =
    Arc<dyn Fn(&mut S, &<S as Submission>::User) -> anyhow::Result<()> + Send + Sync>;

/// Registry of named hooks
pub struct HookRegistry<S: Submission> {
    preconditions: HashMap<String, Precondition<S>>,
    side_effects: HashMap<String, SideEffect<S>>,
}

impl<S: Submission> HookRegistry<S> {
    pub fn new() -> Self {
        Self {
            preconditions: HashMap::new(),
            side_effects: HashMap::new(),
        }
    }

    /// Register (or replace) a named precondition.
    pub fn register_precondition<F>(&mut self, name: impl Into<String>, check: F) -> &mut Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(precondition = %name, "Registering precondition");
        self.preconditions.insert(name, Arc::new(check));
        self
    }

    /// Register (or replace) a named side effect.
    pub fn register_side_effect<F>(&mut self, name: impl Into<String>, effect: F) -> &mut Self
    where
        F: Fn(&mut S, &S::User) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(side_effect = %name, "Registering side effect");
        self.side_effects.insert(name, Arc::new(effect));
        self
    }

    /// Builder form of [`Self::register_precondition`].
    #[must_use]
    pub fn with_precondition<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.register_precondition(name, check);
        self
    }

    /// Builder form of [`Self::register_side_effect`].
    #[must_use]
    pub fn with_side_effect<F>(mut self, name: impl Into<String>, effect: F) -> Self
    where
        F: Fn(&mut S, &S::User) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_side_effect(name, effect);
        self
    }

    pub fn has_precondition(&self, name: &str) -> bool {
        self.preconditions.contains_key(name)
    }

    pub fn has_side_effect(&self, name: &str) -> bool {
        self.side_effects.contains_key(name)
    }

    /// Evaluate a precondition. Unregistered names fail closed.
    pub fn check(&self, name: &str, submission: &S) -> bool {
        self.preconditions
            .get(name)
            .is_some_and(|check| check(submission))
    }

    /// Run a side effect, passing its error through unchanged.
    pub fn run(&self, name: &str, submission: &mut S, user: &S::User) -> WorkflowResult<()> {
        let effect = self
            .side_effects
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Side effect '{name}' is not registered"))?;
        effect(submission, user).map_err(WorkflowError::SideEffect)
    }

    /// Every hook name `registry` references must be registered here.
    pub fn validate(&self, registry: &Registry) -> Result<(), RegistryError> {
        for (workflow, phase, transition, name) in registry.referenced_preconditions() {
            if !self.has_precondition(name) {
                return Err(RegistryError::UnknownPrecondition {
                    workflow: workflow.admin_name().to_string(),
                    phase: phase.name().to_string(),
                    action: transition.target.clone(),
                    name: name.to_string(),
                });
            }
        }
        for (workflow, phase, transition, name) in registry.referenced_side_effects() {
            if !self.has_side_effect(name) {
                return Err(RegistryError::UnknownSideEffect {
                    workflow: workflow.admin_name().to_string(),
                    phase: phase.name().to_string(),
                    action: transition.target.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<S: Submission> Default for HookRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Submission> Clone for HookRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            preconditions: self.preconditions.clone(),
            side_effects: self.side_effects.clone(),
        }
    }
}

impl<S: Submission> fmt::Debug for HookRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut preconditions: Vec<&str> = self.preconditions.keys().map(String::as_str).collect();
        let mut side_effects: Vec<&str> = self.side_effects.keys().map(String::as_str).collect();
        preconditions.sort_unstable();
        side_effects.sort_unstable();
        f.debug_struct("HookRegistry")
            .field("preconditions", &preconditions)
            .field("side_effects", &side_effects)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{CREATE_REVISION, NOT_PROGRESSED, PROGRESS_APPLICATION};
    use crate::services::registry::RegistryOptions;

    struct Doc {
        status: String,
        progressed: bool,
        revisions: u32,
    }

    impl Submission for Doc {
        type User = String;

        fn workflow_name(&self) -> &str {
            "double"
        }

        fn status(&self) -> &str {
            &self.status
        }
    }

    fn doc() -> Doc {
        Doc {
            status: "draft".to_string(),
            progressed: false,
            revisions: 0,
        }
    }

    #[test]
    fn test_check_and_run() {
        let hooks = HookRegistry::<Doc>::new()
            .with_precondition(NOT_PROGRESSED, |d: &Doc| !d.progressed)
            .with_side_effect(CREATE_REVISION, |d: &mut Doc, _user: &String| {
                d.revisions += 1;
                Ok(())
            });

        let mut d = doc();
        assert!(hooks.check(NOT_PROGRESSED, &d));
        d.progressed = true;
        assert!(!hooks.check(NOT_PROGRESSED, &d));
        assert!(!hooks.check("unregistered", &d));

        hooks.run(CREATE_REVISION, &mut d, &"alice".to_string()).unwrap();
        assert_eq!(d.revisions, 1);
    }

    #[test]
    fn test_run_propagates_error() {
        let hooks = HookRegistry::<Doc>::new().with_side_effect("explode", |_: &mut Doc, _: &String| {
            Err(anyhow::anyhow!("storage offline"))
        });
        let err = hooks.run("explode", &mut doc(), &String::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::SideEffect(_)));
        assert_eq!(err.to_string(), "storage offline");

        let err = hooks.run("missing", &mut doc(), &String::new()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validate_reports_missing_hooks() {
        let registry = Registry::builtin(&RegistryOptions::default()).unwrap();

        let hooks = HookRegistry::<Doc>::new();
        assert!(matches!(
            hooks.validate(&registry),
            Err(RegistryError::UnknownPrecondition { name, .. }) if name == NOT_PROGRESSED
        ));

        let hooks = hooks.with_precondition(NOT_PROGRESSED, |_: &Doc| true);
        assert!(matches!(
            hooks.validate(&registry),
            Err(RegistryError::UnknownSideEffect { .. })
        ));

        let hooks = hooks
            .with_side_effect(CREATE_REVISION, |_: &mut Doc, _: &String| Ok(()))
            .with_side_effect(PROGRESS_APPLICATION, |_: &mut Doc, _: &String| Ok(()));
        assert!(hooks.validate(&registry).is_ok());
        assert!(format!("{hooks:?}").contains(PROGRESS_APPLICATION));
    }
}
