//! Roles an acting user can hold with respect to a submission.
//!
//! Global roles (staff, reviewer, ...) come from the user record; scoped
//! roles (lead, applicant-as-owner) depend on the submission and are
//! resolved by the host through a `RoleResolver`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A role used to gate transitions and phase capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Programme staff.
    Staff,
    /// Superuser.
    Admin,
    /// Staff member assigned as lead on this submission.
    Lead,
    /// The applicant (owner of the submission).
    Applicant,
    /// Assigned reviewer.
    Reviewer,
    /// Partner organisation member.
    Partner,
    /// Community reviewer.
    CommunityReviewer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 7] = [
        Self::Staff,
        Self::Admin,
        Self::Lead,
        Self::Applicant,
        Self::Reviewer,
        Self::Partner,
        Self::CommunityReviewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::Lead => "lead",
            Self::Applicant => "applicant",
            Self::Reviewer => "reviewer",
            Self::Partner => "partner",
            Self::CommunityReviewer => "community_reviewer",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "staff" => Some(Self::Staff),
            "admin" | "superuser" => Some(Self::Admin),
            "lead" => Some(Self::Lead),
            "applicant" => Some(Self::Applicant),
            "reviewer" => Some(Self::Reviewer),
            "partner" => Some(Self::Partner),
            "community_reviewer" | "community" => Some(Self::CommunityReviewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of roles.
///
/// Permission checks are OR-semantics: a check passes when the set of roles
/// held by the user intersects the set of roles granted. An empty granted set
/// grants nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roles allowed to perform a transition when the definition does not
    /// narrow them.
    pub fn staff_lead_admin() -> Self {
        Self::from([Role::Staff, Role::Lead, Role::Admin])
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any role is held by both sets.
    pub fn intersects(&self, other: &Self) -> bool {
        self.0.iter().any(|role| other.0.contains(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Role> for RoleSet {
    fn extend<I: IntoIterator<Item = Role>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_str_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("Community-Reviewer"), Some(Role::CommunityReviewer));
        assert_eq!(Role::from_str("janitor"), None);
    }

    #[test]
    fn test_intersects() {
        let granted = RoleSet::staff_lead_admin();
        assert!(granted.intersects(&RoleSet::from([Role::Lead])));
        assert!(!granted.intersects(&RoleSet::from([Role::Applicant, Role::Reviewer])));
        assert!(!RoleSet::new().intersects(&granted));
    }

    #[test]
    fn test_serde_snake_case() {
        let roles = RoleSet::from([Role::CommunityReviewer, Role::Staff]);
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["staff","community_reviewer"]"#);
    }
}
