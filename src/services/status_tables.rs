//! Lookup tables derived from phase names across every registered workflow.
//!
//! Dashboards and list filters group statuses into coarse buckets
//! ("received", "external-review", ...). The groupings follow phase naming
//! conventions shared by all workflows, so they are computed once when the
//! registry is built.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::domain::models::workflow::Workflow;

const RECEIVED: [&str; 2] = ["in_discussion", "proposal_discussion"];

/// Outcome a determination-making transition records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeterminationOutcome {
    Accepted,
    Rejected,
    MoreInfo,
}

impl DeterminationOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::MoreInfo => "more_info",
        }
    }

    fn classify(action: &str) -> Option<Self> {
        if action.contains("accepted") || action.contains("invited_to_proposal") {
            Some(Self::Accepted)
        } else if action.contains("rejected") {
            Some(Self::Rejected)
        } else if action.contains("more_info") {
            Some(Self::MoreInfo)
        } else {
            None
        }
    }
}

/// A named group of statuses for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub slug: &'static str,
    pub name: &'static str,
    pub statuses: Vec<String>,
}

type Membership = fn(&str) -> bool;

const BUCKETS: [(&str, &str, Membership); 9] = [
    ("received", "Received", |s| RECEIVED.contains(&s)),
    ("internal-review", "Internal Review", |s| s.ends_with("internal_review")),
    ("in-discussion", "Ready for Discussion", |s| {
        s.ends_with("discussion") && !RECEIVED.contains(&s)
    }),
    ("more-information", "More information required", |s| s.ends_with("more_info")),
    ("invited-for-proposal", "Invited for Proposal", |s| s == "draft_proposal"),
    ("external-review", "Advisory Council Review", |s| s.ends_with("external_review")),
    ("ready-for-determination", "Ready for Determination", |s| s.ends_with("determination")),
    ("accepted", "Accepted", |s| s.ends_with("accepted")),
    ("dismissed", "Dismissed", |s| s.ends_with("rejected")),
];

/// Precomputed status lookups across all workflows of a registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusTables {
    /// Every distinct phase name, in registry then declaration order.
    pub all_statuses: Vec<String>,
    /// Ordered dashboard buckets.
    pub phases_mapping: Vec<StatusBucket>,
    /// Display name to the phase names that share it.
    pub statuses: BTreeMap<String, BTreeSet<String>>,
    pub active_statuses: Vec<String>,
    pub review_statuses: Vec<String>,
    pub accepted_statuses: Vec<String>,
    pub dismissed_statuses: Vec<String>,
    pub ext_review_statuses: Vec<String>,
    /// Transition targets that record a determination.
    pub determination_transitions: BTreeMap<String, DeterminationOutcome>,
}

impl StatusTables {
    pub fn compute(workflows: &[Workflow]) -> Self {
        let mut seen = HashSet::new();
        let mut tables = Self::default();

        for phase in workflows.iter().flat_map(Workflow::phases) {
            tables
                .statuses
                .entry(phase.display_name().to_string())
                .or_default()
                .insert(phase.name().to_string());

            for transition in phase.transitions() {
                if let Some(outcome) = DeterminationOutcome::classify(&transition.target) {
                    tables
                        .determination_transitions
                        .insert(transition.target.clone(), outcome);
                }
            }

            if seen.insert(phase.name()) {
                tables.all_statuses.push(phase.name().to_string());
            }
        }

        let select = |keep: &dyn Fn(&str) -> bool| -> Vec<String> {
            tables
                .all_statuses
                .iter()
                .filter(|s| keep(s.as_str()))
                .cloned()
                .collect()
        };

        let phases_mapping = BUCKETS
            .iter()
            .map(|&(slug, name, member)| StatusBucket {
                slug,
                name,
                statuses: select(&member),
            })
            .collect();
        let active_statuses = select(&|s| {
            !(s.contains("accepted") || s.contains("rejected") || s.contains("invited"))
        });
        let review_statuses = select(&|s| s.contains("review") && !s.contains("discussion"));
        let accepted_statuses = select(&|s| s.contains("accepted"));
        let dismissed_statuses = select(&|s| s.contains("rejected"));
        let ext_review_statuses = select(&|s| s.ends_with("external_review"));

        tables.phases_mapping = phases_mapping;
        tables.active_statuses = active_statuses;
        tables.review_statuses = review_statuses;
        tables.accepted_statuses = accepted_statuses;
        tables.dismissed_statuses = dismissed_statuses;
        tables.ext_review_statuses = ext_review_statuses;
        tables
    }

    /// The bucket `status` is grouped under, if any.
    pub fn bucket_for(&self, status: &str) -> Option<&StatusBucket> {
        self.phases_mapping
            .iter()
            .find(|bucket| bucket.statuses.iter().any(|s| s == status))
    }

    pub fn bucket(&self, slug: &str) -> Option<&StatusBucket> {
        self.phases_mapping.iter().find(|bucket| bucket.slug == slug)
    }

    pub fn is_active(&self, status: &str) -> bool {
        self.active_statuses.iter().any(|s| s == status)
    }

    pub fn determination_outcome(&self, action: &str) -> Option<DeterminationOutcome> {
        self.determination_transitions.get(action).copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::services::registry::{Registry, RegistryOptions};

    use super::*;

    fn tables() -> StatusTables {
        Registry::builtin(&RegistryOptions::default())
            .unwrap()
            .status_tables()
            .clone()
    }

    #[test]
    fn test_bucket_order() {
        let slugs: Vec<&str> = tables().phases_mapping.iter().map(|b| b.slug).collect();
        assert_eq!(
            slugs,
            vec![
                "received",
                "internal-review",
                "in-discussion",
                "more-information",
                "invited-for-proposal",
                "external-review",
                "ready-for-determination",
                "accepted",
                "dismissed",
            ]
        );
    }

    #[test]
    fn test_received_excluded_from_in_discussion() {
        let tables = tables();
        assert_eq!(
            tables.bucket("received").unwrap().statuses,
            vec!["in_discussion".to_string(), "proposal_discussion".to_string()]
        );
        let discussion = &tables.bucket("in-discussion").unwrap().statuses;
        assert!(discussion.contains(&"post_review_discussion".to_string()));
        assert!(!discussion.contains(&"in_discussion".to_string()));
    }

    #[test]
    fn test_bucket_for() {
        let tables = tables();
        assert_eq!(tables.bucket_for("com_external_review").unwrap().slug, "external-review");
        assert_eq!(tables.bucket_for("draft_proposal").unwrap().slug, "invited-for-proposal");
        assert_eq!(tables.bucket_for("concept_rejected").unwrap().slug, "dismissed");
        assert!(tables.bucket_for("draft").is_none());
    }

    #[test]
    fn test_statuses_grouped_by_display_name() {
        let tables = tables();
        let dismissed = &tables.statuses["Dismissed"];
        for name in ["rejected", "ext_rejected", "com_rejected", "concept_rejected", "proposal_rejected"] {
            assert!(dismissed.contains(name), "{name}");
        }
        assert_eq!(tables.statuses["Draft"].len(), 1);
    }

    #[test]
    fn test_status_lists() {
        let tables = tables();
        assert!(tables.is_active("draft"));
        assert!(tables.is_active("external_review"));
        assert!(!tables.is_active("invited_to_proposal"));
        assert!(!tables.is_active("proposal_accepted"));

        assert!(tables.review_statuses.contains(&"internal_review".to_string()));
        assert!(!tables
            .review_statuses
            .iter()
            .any(|s| s.contains("discussion")));

        assert_eq!(tables.accepted_statuses.len(), 4);
        assert_eq!(tables.dismissed_statuses.len(), 5);
        assert_eq!(
            tables.ext_review_statuses,
            vec![
                "ext_external_review".to_string(),
                "com_external_review".to_string(),
                "external_review".to_string(),
            ]
        );
    }

    #[test]
    fn test_determination_transitions() {
        let tables = tables();
        assert_eq!(
            tables.determination_outcome("invited_to_proposal"),
            Some(DeterminationOutcome::Accepted)
        );
        assert_eq!(tables.determination_outcome("ext_accepted"), Some(DeterminationOutcome::Accepted));
        assert_eq!(tables.determination_outcome("rejected"), Some(DeterminationOutcome::Rejected));
        assert_eq!(
            tables.determination_outcome("proposal_more_info"),
            Some(DeterminationOutcome::MoreInfo)
        );
        assert_eq!(tables.determination_outcome("internal_review"), None);
        assert_eq!(DeterminationOutcome::MoreInfo.as_str(), "more_info");
    }
}
