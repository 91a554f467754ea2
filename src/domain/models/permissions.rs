//! Phase-level capabilities (edit, review, view) and the stock presets used
//! by the built-in workflows.

use serde::{Deserialize, Serialize};

use super::role::{Role, RoleSet};

/// Something a user may be allowed to do with a submission while it sits in
/// a given phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Edit,
    Review,
    View,
}

/// Per-capability grants for a phase.
///
/// Each capability is granted to a set of roles; a user holding any of them
/// has the capability. An empty set fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub edit: RoleSet,
    #[serde(default)]
    pub review: RoleSet,
    #[serde(default = "default_view")]
    pub view: RoleSet,
}

fn default_view() -> RoleSet {
    RoleSet::from([Role::Staff, Role::Applicant, Role::Reviewer, Role::Partner])
}

impl Default for PermissionSet {
    fn default() -> Self {
        PermissionPreset::NoPermissions.permissions()
    }
}

impl PermissionSet {
    pub fn new(edit: RoleSet, review: RoleSet, view: RoleSet) -> Self {
        Self { edit, review, view }
    }

    fn granted(&self, capability: Capability) -> &RoleSet {
        match capability {
            Capability::Edit => &self.edit,
            Capability::Review => &self.review,
            Capability::View => &self.view,
        }
    }

    /// Whether a user holding `roles` has `capability`.
    pub fn can(&self, capability: Capability, roles: &RoleSet) -> bool {
        self.granted(capability).intersects(roles)
    }

    pub fn can_edit(&self, roles: &RoleSet) -> bool {
        self.can(Capability::Edit, roles)
    }

    pub fn can_review(&self, roles: &RoleSet) -> bool {
        self.can(Capability::Review, roles)
    }

    pub fn can_view(&self, roles: &RoleSet) -> bool {
        self.can(Capability::View, roles)
    }
}

/// Named permission sets shared by the built-in workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPreset {
    /// Nobody edits or reviews; the usual audience can view.
    NoPermissions,
    /// Staff edit and review.
    Default,
    /// Staff edit and review; only staff and reviewers can see the phase.
    HiddenFromApplicant,
    /// Staff edit; staff and reviewers review.
    ReviewerReview,
    /// Staff edit; staff, reviewers and community reviewers review.
    CommunityReview,
    /// Applicant and partners edit; staff review.
    ApplicantEdit,
    /// Staff edit; nobody reviews.
    StaffEdit,
}

impl PermissionPreset {
    pub fn permissions(self) -> PermissionSet {
        let staff = || RoleSet::from([Role::Staff]);
        match self {
            Self::NoPermissions => PermissionSet::new(RoleSet::new(), RoleSet::new(), default_view()),
            Self::Default => PermissionSet::new(staff(), staff(), default_view()),
            Self::HiddenFromApplicant => PermissionSet::new(
                staff(),
                staff(),
                RoleSet::from([Role::Staff, Role::Reviewer]),
            ),
            Self::ReviewerReview => PermissionSet::new(
                staff(),
                RoleSet::from([Role::Staff, Role::Reviewer]),
                default_view(),
            ),
            Self::CommunityReview => PermissionSet::new(
                staff(),
                RoleSet::from([Role::Staff, Role::Reviewer, Role::CommunityReviewer]),
                default_view(),
            ),
            Self::ApplicantEdit => PermissionSet::new(
                RoleSet::from([Role::Applicant, Role::Partner]),
                staff(),
                default_view(),
            ),
            Self::StaffEdit => PermissionSet::new(staff(), RoleSet::new(), default_view()),
        }
    }
}

impl From<PermissionPreset> for PermissionSet {
    fn from(preset: PermissionPreset) -> Self {
        preset.permissions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grant_fails_closed() {
        let perms = PermissionPreset::NoPermissions.permissions();
        let everyone: RoleSet = Role::ALL.into_iter().collect();
        assert!(!perms.can_edit(&everyone));
        assert!(!perms.can_review(&everyone));
        assert!(perms.can_view(&everyone));
    }

    #[test]
    fn test_hidden_from_applicant() {
        let perms = PermissionPreset::HiddenFromApplicant.permissions();
        assert!(!perms.can_view(&RoleSet::from([Role::Applicant])));
        assert!(!perms.can_view(&RoleSet::from([Role::Partner])));
        assert!(perms.can_view(&RoleSet::from([Role::Reviewer])));
        assert!(perms.can_view(&RoleSet::from([Role::Applicant, Role::Staff])));
    }

    #[test]
    fn test_community_review() {
        let perms = PermissionPreset::CommunityReview.permissions();
        assert!(perms.can_review(&RoleSet::from([Role::CommunityReviewer])));
        assert!(!PermissionPreset::ReviewerReview
            .permissions()
            .can_review(&RoleSet::from([Role::CommunityReviewer])));
    }

    #[test]
    fn test_applicant_edit() {
        let perms = PermissionPreset::ApplicantEdit.permissions();
        assert!(perms.can(Capability::Edit, &RoleSet::from([Role::Partner])));
        assert!(!perms.can(Capability::Edit, &RoleSet::from([Role::Staff])));
    }

    #[test]
    fn test_serde_defaults_view() {
        let perms: PermissionSet = serde_json::from_str(r#"{"edit":["staff"]}"#).unwrap();
        assert!(perms.review.is_empty());
        assert!(perms.can_view(&RoleSet::from([Role::Partner])));
    }

    #[test]
    fn test_preset_serde() {
        let preset: PermissionPreset = serde_json::from_str("\"hidden_from_applicant\"").unwrap();
        assert_eq!(preset, PermissionPreset::HiddenFromApplicant);
    }
}
