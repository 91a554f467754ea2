//! Common test utilities for integration tests
//!
//! Provides a submission type, a user type with owner-scoped roles and a
//! ready-made transition engine over the built-in workflows.

#![allow(dead_code)]

use std::sync::Arc;

use grantflow::services::catalog::{CREATE_REVISION, NOT_PROGRESSED, PROGRESS_APPLICATION};
use grantflow::{
    HookRegistry, Registry, RegistryOptions, Role, RoleSet, Submission, TransitionEngine,
};

/// An acting user: an id plus global roles.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: u32,
    pub roles: RoleSet,
}

impl TestUser {
    pub fn new(id: u32, roles: impl Into<RoleSet>) -> Self {
        Self {
            id,
            roles: roles.into(),
        }
    }

    pub fn staff() -> Self {
        Self::new(100, [Role::Staff])
    }

    pub fn reviewer() -> Self {
        Self::new(200, [Role::Reviewer])
    }
}

/// A submission owned by `owner` with an optional assigned lead.
#[derive(Debug, Clone)]
pub struct TestSubmission {
    pub workflow: String,
    pub status: String,
    pub owner: u32,
    pub lead: Option<u32>,
    pub progressed: bool,
    pub revisions: u32,
    /// When set, `create_revision` fails with this message.
    pub fail_revision: Option<String>,
}

impl TestSubmission {
    pub fn new(workflow: &str, status: &str) -> Self {
        Self {
            workflow: workflow.to_string(),
            status: status.to_string(),
            owner: 1,
            lead: None,
            progressed: false,
            revisions: 0,
            fail_revision: None,
        }
    }

    pub fn owner(&self) -> TestUser {
        TestUser::new(self.owner, [Role::Applicant])
    }
}

impl Submission for TestSubmission {
    type User = TestUser;

    fn workflow_name(&self) -> &str {
        &self.workflow
    }

    fn status(&self) -> &str {
        &self.status
    }
}

/// Global roles plus Lead for the assigned lead. Applicant only counts for
/// the owner.
pub fn resolve_roles(user: &TestUser, submission: &TestSubmission) -> RoleSet {
    let mut roles: RoleSet = user
        .roles
        .iter()
        .filter(|role| *role != Role::Applicant || user.id == submission.owner)
        .collect();
    if submission.lead == Some(user.id) {
        roles.insert(Role::Lead);
    }
    roles
}

pub fn hooks() -> HookRegistry<TestSubmission> {
    HookRegistry::new()
        .with_precondition(NOT_PROGRESSED, |s: &TestSubmission| !s.progressed)
        .with_side_effect(CREATE_REVISION, |s: &mut TestSubmission, _: &TestUser| {
            if let Some(message) = &s.fail_revision {
                anyhow::bail!("{message}");
            }
            s.revisions += 1;
            Ok(())
        })
        .with_side_effect(PROGRESS_APPLICATION, |s: &mut TestSubmission, _: &TestUser| {
            s.progressed = true;
            Ok(())
        })
}

pub fn registry() -> Arc<Registry> {
    Registry::builtin(&RegistryOptions::default())
        .expect("built-in workflows are valid")
        .into_shared()
}

pub fn engine() -> TransitionEngine<TestSubmission> {
    TransitionEngine::new(registry(), hooks(), resolve_roles).expect("all hooks registered")
}
