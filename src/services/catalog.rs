//! Built-in workflow definitions.
//!
//! Four process variants share the same engine:
//!
//! ```text
//! single      Request                         draft → screening → review → determination → outcome
//! single_ext  Request with external review    ... → internal review → advisory council → ...
//! single_com  Request with community review   ... → community review → advisory council → ...
//! double      Concept & Proposal              concept stage → invited_to_proposal ⇒ proposal stage
//! ```
//!
//! Phase names are unique within a workflow; `draft` and `in_discussion` are
//! shared by every workflow so new submissions always start the same way.

use crate::domain::models::definition::{
    PhaseDefinition, StageDefinition, TransitionDefinition, WorkflowDefinition,
};
use crate::domain::models::permissions::PermissionPreset::{
    ApplicantEdit, CommunityReview, Default as DefaultPerms, HiddenFromApplicant, NoPermissions,
    ReviewerReview, StaffEdit,
};
use crate::domain::models::role::Role;

/// Phase every new submission is created in.
pub const DRAFT_STATE: &str = "draft";

/// Phase a submission lands in once the applicant submits it.
pub const INITIAL_STATE: &str = "in_discussion";

/// Precondition: the submission has not yet been progressed to its next stage.
pub const NOT_PROGRESSED: &str = "not_progressed";

/// Side effect: snapshot the applicant's answers as a new revision.
pub const CREATE_REVISION: &str = "create_revision";

/// Side effect: create the next-stage submission (concept → proposal).
pub const PROGRESS_APPLICATION: &str = "progress_application";

/// Preconditions referenced by the built-in workflows.
pub const BUILTIN_PRECONDITIONS: &[&str] = &[NOT_PROGRESSED];

/// Side effects referenced by the built-in workflows.
pub const BUILTIN_SIDE_EFFECTS: &[&str] = &[CREATE_REVISION, PROGRESS_APPLICATION];

const ORG_REVIEW: &str = "{org_short_name} Review";

/// Applicant submit: only the owning applicant, snapshots a revision.
fn submit(target: &str) -> TransitionDefinition {
    TransitionDefinition::new(target, "Submit")
        .roles([Role::Applicant])
        .side_effect(CREATE_REVISION)
}

/// Submit after a more-information request: applicant or staff on their behalf.
fn resubmit(target: &str) -> TransitionDefinition {
    TransitionDefinition::new(target, "Submit")
        .roles([Role::Applicant, Role::Staff, Role::Lead, Role::Admin])
        .side_effect(CREATE_REVISION)
}

fn stage(name: &str, has_external_review: bool) -> StageDefinition {
    StageDefinition {
        name: name.to_string(),
        has_external_review,
    }
}

fn draft(stage: &str) -> PhaseDefinition {
    PhaseDefinition::new(DRAFT_STATE, "Draft", stage, ApplicantEdit).transition(submit(INITIAL_STATE))
}

/// All built-in definitions in registry order.
pub fn builtin_definitions() -> Vec<WorkflowDefinition> {
    vec![
        single_stage(),
        single_stage_external(),
        single_stage_community(),
        double_stage(),
    ]
}

/// Single-stage request.
pub fn single_stage() -> WorkflowDefinition {
    let s = "Request";
    WorkflowDefinition {
        name: "Request".to_string(),
        admin_name: "single".to_string(),
        stages: vec![stage(s, false)],
        steps: vec![
            vec![draft(s)],
            vec![
                PhaseDefinition::new(INITIAL_STATE, "Screening", s, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("more_info", "Request More Information")
                    .to("internal_review", "Open Review")
                    .to("determination", "Ready For Determination")
                    .to("rejected", "Dismiss"),
                PhaseDefinition::new("more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit(INITIAL_STATE))
                    .to("determination", "Ready For Determination")
                    .to("rejected", "Dismiss"),
            ],
            vec![PhaseDefinition::new("internal_review", "Internal Review", s, DefaultPerms)
                .public(ORG_REVIEW)
                .to("post_review_discussion", "Close Review")
                .to(INITIAL_STATE, "Screening (revert)")],
            vec![
                PhaseDefinition::new("post_review_discussion", "Ready For Discussion", s, HiddenFromApplicant)
                    .to("post_review_more_info", "Request More Information")
                    .to("determination", "Ready For Determination")
                    .to("internal_review", "Open Review (revert)")
                    .to("rejected", "Dismiss"),
                PhaseDefinition::new("post_review_more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit("post_review_discussion")),
            ],
            vec![PhaseDefinition::new("determination", "Ready for Determination", s, HiddenFromApplicant)
                .to("post_review_discussion", "Ready For Discussion (revert)")
                .to("accepted", "Accept")
                .to("almost", "Accept but additional info required")
                .to("rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("accepted", "Accepted", s, StaffEdit).future("Application Outcome"),
                PhaseDefinition::new("almost", "Accepted but additional info required", s, ApplicantEdit)
                    .to("accepted", "Accept")
                    .to("post_review_discussion", "Ready For Discussion (revert)"),
                PhaseDefinition::new("rejected", "Dismissed", s, NoPermissions),
            ],
        ],
    }
}

/// Single-stage request with an advisory council (external) review.
pub fn single_stage_external() -> WorkflowDefinition {
    let s = "RequestExt";
    WorkflowDefinition {
        name: "Request with external review".to_string(),
        admin_name: "single_ext".to_string(),
        stages: vec![stage(s, true)],
        steps: vec![
            vec![draft(s)],
            vec![
                PhaseDefinition::new(INITIAL_STATE, "Screening", s, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("ext_more_info", "Request More Information")
                    .to("ext_internal_review", "Open Review")
                    .to("ext_determination", "Ready For Determination")
                    .to("ext_rejected", "Dismiss"),
                PhaseDefinition::new("ext_more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit(INITIAL_STATE)),
            ],
            vec![PhaseDefinition::new("ext_internal_review", "Internal Review", s, DefaultPerms)
                .public(ORG_REVIEW)
                .to("ext_post_review_discussion", "Close Review")
                .to(INITIAL_STATE, "Screening (revert)")],
            vec![
                PhaseDefinition::new("ext_post_review_discussion", "Ready For Discussion", s, HiddenFromApplicant)
                    .to("ext_post_review_more_info", "Request More Information")
                    .to("ext_external_review", "Open AC review")
                    .to("ext_determination", "Ready For Determination")
                    .to("ext_internal_review", "Open Internal Review (revert)")
                    .to("ext_rejected", "Dismiss"),
                PhaseDefinition::new("ext_post_review_more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit("ext_post_review_discussion")),
            ],
            vec![PhaseDefinition::new("ext_external_review", "Advisory Council Review", s, ReviewerReview)
                .public(ORG_REVIEW)
                .to("ext_post_external_review_discussion", "Close Review")
                .to("ext_post_review_discussion", "Ready For Discussion (revert)")],
            vec![
                PhaseDefinition::new(
                    "ext_post_external_review_discussion",
                    "Ready For Discussion",
                    s,
                    HiddenFromApplicant,
                )
                .to("ext_post_external_review_more_info", "Request More Information")
                .to("ext_determination", "Ready For Determination")
                .to("ext_external_review", "Open AC review (revert)")
                .to("ext_rejected", "Dismiss"),
                PhaseDefinition::new(
                    "ext_post_external_review_more_info",
                    "More information required",
                    s,
                    ApplicantEdit,
                )
                .transition(resubmit("ext_post_external_review_discussion")),
            ],
            vec![PhaseDefinition::new("ext_determination", "Ready for Determination", s, HiddenFromApplicant)
                .to("ext_post_external_review_discussion", "Ready For Discussion (revert)")
                .to("ext_accepted", "Accept")
                .to("ext_almost", "Accept but additional info required")
                .to("ext_rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("ext_accepted", "Accepted", s, StaffEdit).future("Application Outcome"),
                PhaseDefinition::new("ext_almost", "Accepted but additional info required", s, ApplicantEdit)
                    .to("ext_accepted", "Accept")
                    .to("ext_post_external_review_discussion", "Ready For Discussion (revert)"),
                PhaseDefinition::new("ext_rejected", "Dismissed", s, NoPermissions),
            ],
        ],
    }
}

/// Single-stage request with community review ahead of the advisory council.
pub fn single_stage_community() -> WorkflowDefinition {
    let s = "RequestCom";
    WorkflowDefinition {
        name: "Request with community review".to_string(),
        admin_name: "single_com".to_string(),
        stages: vec![stage(s, true)],
        steps: vec![
            vec![draft(s)],
            vec![
                PhaseDefinition::new(INITIAL_STATE, "Screening", s, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("com_more_info", "Request More Information")
                    .to("com_open_call", "Open Call (public)")
                    .to("com_internal_review", "Open Review")
                    .to("com_community_review", "Open Community Review")
                    .to("com_determination", "Ready For Determination")
                    .to("com_rejected", "Dismiss"),
                PhaseDefinition::new("com_more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit(INITIAL_STATE))
                    .to("com_determination", "Ready For Determination")
                    .to("com_rejected", "Dismiss"),
                PhaseDefinition::new("com_open_call", "Open Call (public)", s, StaffEdit)
                    .to("com_rejected", "Close"),
            ],
            vec![
                PhaseDefinition::new("com_internal_review", "Internal Review", s, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("com_community_review", "Open Community Review")
                    .to("com_post_review_discussion", "Close Review")
                    .to(INITIAL_STATE, "Screening (revert)")
                    .to("com_rejected", "Dismiss"),
                PhaseDefinition::new("com_community_review", "Community Review", s, CommunityReview)
                    .public(ORG_REVIEW)
                    .to("com_post_review_discussion", "Close Review")
                    .to("com_internal_review", "Open Internal Review (revert)")
                    .to("com_rejected", "Dismiss"),
            ],
            vec![
                PhaseDefinition::new("com_post_review_discussion", "Ready For Discussion", s, HiddenFromApplicant)
                    .to("com_post_review_more_info", "Request More Information")
                    .to("com_external_review", "Open AC review")
                    .to("com_determination", "Ready For Determination")
                    .to("com_internal_review", "Open Internal Review (revert)")
                    .to("com_rejected", "Dismiss"),
                PhaseDefinition::new("com_post_review_more_info", "More information required", s, ApplicantEdit)
                    .transition(resubmit("com_post_review_discussion")),
            ],
            vec![PhaseDefinition::new("com_external_review", "Advisory Council Review", s, ReviewerReview)
                .public(ORG_REVIEW)
                .to("com_post_external_review_discussion", "Close Review")
                .to("com_post_review_discussion", "Ready For Discussion (revert)")],
            vec![
                PhaseDefinition::new(
                    "com_post_external_review_discussion",
                    "Ready For Discussion",
                    s,
                    HiddenFromApplicant,
                )
                .to("com_post_external_review_more_info", "Request More Information")
                .to("com_determination", "Ready For Determination")
                .to("com_external_review", "Open AC review (revert)")
                .to("com_rejected", "Dismiss"),
                PhaseDefinition::new(
                    "com_post_external_review_more_info",
                    "More information required",
                    s,
                    ApplicantEdit,
                )
                .transition(resubmit("com_post_external_review_discussion")),
            ],
            vec![PhaseDefinition::new("com_determination", "Ready for Determination", s, HiddenFromApplicant)
                .to("com_post_external_review_discussion", "Ready For Discussion (revert)")
                .to("com_accepted", "Accept")
                .to("com_almost", "Accept but additional info required")
                .to("com_rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("com_accepted", "Accepted", s, StaffEdit).future("Application Outcome"),
                PhaseDefinition::new("com_almost", "Accepted but additional info required", s, ApplicantEdit)
                    .to("com_accepted", "Accept")
                    .to("com_post_external_review_discussion", "Ready For Discussion (revert)"),
                PhaseDefinition::new("com_rejected", "Dismissed", s, NoPermissions),
            ],
        ],
    }
}

/// Two-stage concept note followed by an invited full proposal.
pub fn double_stage() -> WorkflowDefinition {
    let c = "Concept";
    let p = "Proposal";
    WorkflowDefinition {
        name: "Concept & Proposal".to_string(),
        admin_name: "double".to_string(),
        stages: vec![stage(c, false), stage(p, true)],
        steps: vec![
            vec![draft(c)],
            vec![
                PhaseDefinition::new(INITIAL_STATE, "Screening", c, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("concept_more_info", "Request More Information")
                    .to("concept_internal_review", "Open Review")
                    .to("concept_determination", "Ready For Preliminary Determination")
                    .to("invited_to_proposal", "Invite to Proposal")
                    .to("concept_rejected", "Dismiss"),
                PhaseDefinition::new("concept_more_info", "More information required", c, ApplicantEdit)
                    .transition(resubmit(INITIAL_STATE))
                    .to("concept_rejected", "Dismiss")
                    .to("invited_to_proposal", "Invite to Proposal")
                    .to("concept_determination", "Ready For Preliminary Determination"),
            ],
            vec![PhaseDefinition::new("concept_internal_review", "Internal Review", c, DefaultPerms)
                .public(ORG_REVIEW)
                .to("concept_review_discussion", "Close Review")
                .to(INITIAL_STATE, "Screening (revert)")
                .to("invited_to_proposal", "Invite to Proposal")],
            vec![
                PhaseDefinition::new("concept_review_discussion", "Ready For Discussion", c, HiddenFromApplicant)
                    .to("concept_review_more_info", "Request More Information")
                    .to("concept_determination", "Ready For Preliminary Determination")
                    .to("invited_to_proposal", "Invite to Proposal")
                    .to("concept_internal_review", "Open Review (revert)")
                    .to("concept_rejected", "Dismiss"),
                PhaseDefinition::new("concept_review_more_info", "More information required", c, ApplicantEdit)
                    .transition(resubmit("concept_review_discussion"))
                    .to("invited_to_proposal", "Invite to Proposal"),
            ],
            vec![PhaseDefinition::new(
                "concept_determination",
                "Ready for Preliminary Determination",
                c,
                HiddenFromApplicant,
            )
            .to("concept_review_discussion", "Ready For Discussion (revert)")
            .to("invited_to_proposal", "Invite to Proposal")
            .to("concept_rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("invited_to_proposal", "Concept Accepted", c, NoPermissions)
                    .future("Preliminary Determination")
                    .transition(
                        TransitionDefinition::new("draft_proposal", "Progress")
                            .roles([Role::Staff, Role::Lead, Role::Admin])
                            .precondition(NOT_PROGRESSED)
                            .side_effect(PROGRESS_APPLICATION),
                    ),
                PhaseDefinition::new("concept_rejected", "Dismissed", c, NoPermissions),
            ],
            vec![PhaseDefinition::new("draft_proposal", "Invited for Proposal", p, ApplicantEdit)
                .transition(submit("proposal_discussion"))
                .to("external_review", "Open AC review")
                .to("proposal_rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("proposal_discussion", "Proposal Received", p, DefaultPerms)
                    .public(ORG_REVIEW)
                    .to("proposal_more_info", "Request More Information")
                    .to("proposal_internal_review", "Open Review")
                    .to("external_review", "Open AC review")
                    .to("proposal_determination", "Ready For Final Determination")
                    .to("proposal_rejected", "Dismiss"),
                PhaseDefinition::new("proposal_more_info", "More information required", p, ApplicantEdit)
                    .transition(resubmit("proposal_discussion"))
                    .to("external_review", "Open AC review")
                    .to("proposal_determination", "Ready For Final Determination")
                    .to("proposal_rejected", "Dismiss"),
            ],
            vec![PhaseDefinition::new("proposal_internal_review", "Internal Review", p, DefaultPerms)
                .public(ORG_REVIEW)
                .to("post_proposal_review_discussion", "Close Review")
                .to("proposal_discussion", "Proposal Received (revert)")],
            vec![
                PhaseDefinition::new(
                    "post_proposal_review_discussion",
                    "Ready For Discussion",
                    p,
                    HiddenFromApplicant,
                )
                .to("post_proposal_review_more_info", "Request More Information")
                .to("external_review", "Open AC review")
                .to("proposal_determination", "Ready For Final Determination")
                .to("proposal_internal_review", "Open Internal Review (revert)")
                .to("proposal_rejected", "Dismiss"),
                PhaseDefinition::new(
                    "post_proposal_review_more_info",
                    "More information required",
                    p,
                    ApplicantEdit,
                )
                .transition(resubmit("post_proposal_review_discussion"))
                .to("external_review", "Open AC review"),
            ],
            vec![PhaseDefinition::new("external_review", "Advisory Council Review", p, ReviewerReview)
                .public(ORG_REVIEW)
                .to("post_external_review_discussion", "Close Review")
                .to("post_proposal_review_discussion", "Ready For Discussion (revert)")],
            vec![
                PhaseDefinition::new(
                    "post_external_review_discussion",
                    "Ready For Discussion",
                    p,
                    HiddenFromApplicant,
                )
                .to("post_external_review_more_info", "Request More Information")
                .to("proposal_determination", "Ready For Final Determination")
                .to("external_review", "Open AC review (revert)")
                .to("proposal_rejected", "Dismiss"),
                PhaseDefinition::new(
                    "post_external_review_more_info",
                    "More information required",
                    p,
                    ApplicantEdit,
                )
                .transition(resubmit("post_external_review_discussion")),
            ],
            vec![PhaseDefinition::new(
                "proposal_determination",
                "Ready for Final Determination",
                p,
                HiddenFromApplicant,
            )
            .to("post_external_review_discussion", "Ready For Discussion (revert)")
            .to("proposal_accepted", "Accept")
            .to("proposal_almost", "Accept but additional info required")
            .to("proposal_rejected", "Dismiss")],
            vec![
                PhaseDefinition::new("proposal_accepted", "Accepted", p, StaffEdit).future("Final Determination"),
                PhaseDefinition::new("proposal_almost", "Accepted but additional info required", p, ApplicantEdit)
                    .to("proposal_accepted", "Accept")
                    .to("post_external_review_discussion", "Ready For Discussion (revert)"),
                PhaseDefinition::new("proposal_rejected", "Dismissed", p, NoPermissions),
            ],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_admin_names() {
        let names: Vec<String> = builtin_definitions().into_iter().map(|d| d.admin_name).collect();
        assert_eq!(names, vec!["single", "single_ext", "single_com", "double"]);
    }

    #[test]
    fn test_every_workflow_starts_with_draft_then_screening() {
        for def in builtin_definitions() {
            let phases: Vec<_> = def.phases().collect();
            assert_eq!(phases[0].1.name, DRAFT_STATE, "{}", def.admin_name);
            assert_eq!(phases[1].1.name, INITIAL_STATE, "{}", def.admin_name);
            assert_eq!(phases[0].0, 0);
            assert_eq!(phases[1].0, 1);
        }
    }

    #[test]
    fn test_only_known_hooks_are_referenced() {
        for def in builtin_definitions() {
            for (_, phase) in def.phases() {
                for t in &phase.transitions {
                    for p in &t.preconditions {
                        assert!(BUILTIN_PRECONDITIONS.contains(&p.as_str()));
                    }
                    if let Some(effect) = &t.side_effect {
                        assert!(BUILTIN_SIDE_EFFECTS.contains(&effect.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_phase_sets_public_and_future() {
        for def in builtin_definitions() {
            for (_, phase) in def.phases() {
                assert!(
                    !(phase.public.is_some() && phase.future.is_some()),
                    "{}/{}",
                    def.admin_name,
                    phase.name
                );
            }
        }
    }

    #[test]
    fn test_double_stage_has_two_stages() {
        let def = double_stage();
        let stages: HashSet<&str> = def.phases().map(|(_, p)| p.stage.as_str()).collect();
        assert_eq!(stages.len(), 2);
        assert!(def.stages[1].has_external_review);
    }
}
