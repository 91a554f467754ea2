mod common;

use common::{engine, registry, TestSubmission, TestUser};
use grantflow::{Audience, Role, RoleSet};
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

fn roles() -> impl Strategy<Value = RoleSet> {
    subsequence(Role::ALL.to_vec(), 0..=Role::ALL.len()).prop_map(|roles| roles.into_iter().collect())
}

fn workflow_name() -> impl Strategy<Value = &'static str> {
    select(vec!["single", "single_ext", "single_com", "double"])
}

proptest! {
    /// Property: a random walk never leaves the workflow, only auto-progresses
    /// through stage-change actions and is deterministic at every step.
    #[test]
    fn prop_random_walk_stays_closed(
        workflow in workflow_name(),
        choices in prop::collection::vec((any::<prop::sample::Index>(), roles()), 1..30),
    ) {
        let engine = engine();
        let wf = engine.registry().workflow(workflow).unwrap();
        let stage_changes = engine.registry().stage_change_actions();
        let mut submission = TestSubmission::new(workflow, "draft");

        for (pick, held) in choices {
            let user = TestUser::new(submission.owner, held);
            let actions: Vec<String> = engine
                .actions_for(&submission, &user)
                .unwrap()
                .into_iter()
                .map(|(action, _)| action.to_string())
                .collect();
            if actions.is_empty() {
                continue;
            }
            let action = pick.get(&actions);

            let mut replay = submission.clone();
            let outcome = engine.perform(&mut submission, action, &user).unwrap();
            let again = engine.perform(&mut replay, action, &user).unwrap();

            prop_assert!(wf.contains(&outcome.status), "{} left the workflow", outcome.status);
            for reached in &outcome.auto_progressed {
                prop_assert!(stage_changes.contains(reached), "{} is not a stage change", reached);
            }
            prop_assert_eq!(&outcome.status, &again.status);
            prop_assert_eq!(&outcome.auto_progressed, &again.auto_progressed);

            submission.status = outcome.status;
        }
    }

    /// Property: granting more roles never removes an available action.
    #[test]
    fn prop_permission_monotonicity(
        workflow in workflow_name(),
        phase_pick in any::<prop::sample::Index>(),
        base in roles(),
        extra in roles(),
        progressed in any::<bool>(),
    ) {
        let engine = engine();
        let wf = engine.registry().workflow(workflow).unwrap();
        let phase = pick_phase(wf.phases(), phase_pick);

        let mut submission = TestSubmission::new(workflow, phase);
        submission.progressed = progressed;

        let mut wider = base.clone();
        wider.extend(extra.iter());
        let narrow_user = TestUser::new(submission.owner, base);
        let wide_user = TestUser::new(submission.owner, wider);

        let narrow = engine.actions_for(&submission, &narrow_user).unwrap();
        let wide = engine.actions_for(&submission, &wide_user).unwrap();
        for action in &narrow {
            prop_assert!(wide.contains(action), "{:?} lost with more roles", action);
        }
    }

    /// Property: display names are a pure function of audience and reach.
    #[test]
    fn prop_name_for_is_idempotent(
        workflow in workflow_name(),
        phase_pick in any::<prop::sample::Index>(),
        public in any::<bool>(),
        reached in any::<bool>(),
    ) {
        let registry = registry();
        let wf = registry.workflow(workflow).unwrap();
        let phase = wf.phase(pick_phase(wf.phases(), phase_pick)).unwrap();
        let audience = if public { Audience::Public } else { Audience::Staff };

        let first = phase.name_for(audience, reached).to_string();
        prop_assert_eq!(first.as_str(), phase.name_for(audience, reached));
        if !public {
            prop_assert_eq!(first.as_str(), phase.display_name());
        }
    }
}

fn pick_phase(phases: &[grantflow::Phase], pick: prop::sample::Index) -> &str {
    phases[pick.index(phases.len())].name()
}

#[test]
fn test_every_transition_target_exists() {
    let registry = registry();
    for wf in registry.workflows() {
        for phase in wf.phases() {
            for transition in phase.transitions() {
                assert!(wf.contains(&transition.target));
            }
        }
    }
}
