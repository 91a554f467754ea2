//! Action aggregation across workflows.
//!
//! Bulk actions in list views are offered by label ("Dismiss", "Open
//! Review"), while each workflow names the underlying transitions after its
//! own phases (`rejected`, `ext_rejected`, ...). The mapping groups every
//! transition under the slug of its label so a single bulk choice can be
//! resolved to the right action per submission.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::phase::Phase;
use crate::domain::models::workflow::Workflow;

/// Lowercase, drop everything but word characters, spaces and hyphens,
/// collapse whitespace/hyphen runs to `-` and trim `-`/`_` from both ends.
///
/// Non-ASCII letters are kept as-is: "Réviser" and "Reviser" are different
/// actions. Labels that should merge must be spelled identically.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut separator = false;
    for c in label.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            separator = true;
        } else if c.is_alphanumeric() || c == '_' {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        }
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// One bulk action and the transitions it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedAction {
    pub slug: String,
    /// Label of the first transition seen with this slug.
    pub display: String,
    /// Target phase names, deduplicated, first-seen order.
    pub targets: Vec<String>,
}

/// Slug-keyed actions in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ActionMapping {
    actions: Vec<MappedAction>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ActionMapping {
    pub fn get(&self, slug: &str) -> Option<&MappedAction> {
        self.index.get(slug).map(|&i| &self.actions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappedAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The concrete action the bulk choice `slug` maps to for a submission
    /// sitting in `phase`, if the phase offers one.
    pub fn action_for<'a>(&'a self, slug: &str, phase: &Phase) -> Option<&'a str> {
        self.get(slug)?
            .targets
            .iter()
            .find(|target| phase.transition(target).is_some())
            .map(String::as_str)
    }

    fn add(&mut self, display: &str, target: &str) {
        let slug = slugify(display);
        if let Some(&i) = self.index.get(&slug) {
            let action = &mut self.actions[i];
            if !action.targets.iter().any(|t| t == target) {
                action.targets.push(target.to_string());
            }
            return;
        }
        self.index.insert(slug.clone(), self.actions.len());
        self.actions.push(MappedAction {
            slug,
            display: display.to_string(),
            targets: vec![target.to_string()],
        });
    }
}

impl<'a> IntoIterator for &'a ActionMapping {
    type Item = &'a MappedAction;
    type IntoIter = std::slice::Iter<'a, MappedAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

/// Group every transition of `workflows` under its label slug.
pub fn build(workflows: &[Workflow]) -> ActionMapping {
    let mut mapping = ActionMapping::default();
    for phase in workflows.iter().flat_map(Workflow::phases) {
        for transition in phase.transitions() {
            mapping.add(&transition.display, &transition.target);
        }
    }
    mapping
}
