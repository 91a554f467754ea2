//! Ports the host application implements to drive submissions through the
//! engine.

use super::models::role::RoleSet;

/// A submission-like object whose status the engine drives.
///
/// The engine reads the workflow name and current status and hands the
/// submission to preconditions and side-effect hooks. It never writes the
/// status back; persisting the returned status is the caller's job.
///
/// During auto-progression the engine evaluates stage-change actions from
/// statuses the submission has not been told about yet, so `status()` still
/// returns the status the call started from. Preconditions, side effects and
/// role resolvers must not rely on it to know the phase being left.
pub trait Submission {
    /// The acting user type of the host application.
    type User;

    /// Registry key of the workflow this submission follows.
    fn workflow_name(&self) -> &str;

    /// Current phase name.
    fn status(&self) -> &str;
}

/// Maps an acting user to the roles they hold on a submission.
///
/// Global roles (staff, reviewer, partner, ...) come from the user alone;
/// scoped roles (lead, applicant-as-owner) compare the user with the
/// submission. Supplied once when the transition engine is built.
pub trait RoleResolver<S: Submission>: Send + Sync {
    fn roles(&self, user: &S::User, submission: &S) -> RoleSet;
}

impl<S, F> RoleResolver<S> for F
where
    S: Submission,
    F: Fn(&S::User, &S) -> RoleSet + Send + Sync,
{
    fn roles(&self, user: &S::User, submission: &S) -> RoleSet {
        self(user, submission)
    }
}
