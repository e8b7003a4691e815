//! Property tests: harmonization writes respect the reset value and decay floor.

use attune_harmonizer::{ActionPlanner, EntropyAnalyzer};
use attune_types::{
    Candidate, CandidateId, HarmonizationAction, ResonanceState, SelectionEvent, UserId,
    VersionedCandidate,
};
use chrono::Utc;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_pool() -> impl Strategy<Value = Vec<VersionedCandidate>> {
    prop::collection::vec(0.0f64..=1.0, 1..10).prop_map(|weights| {
        weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| VersionedCandidate {
                candidate: Candidate::new(format!("c{i}")).with_learning_weight(w),
                version: 1,
            })
            .collect()
    })
}

fn ids(pool: &[VersionedCandidate]) -> Vec<CandidateId> {
    pool.iter().map(|v| v.candidate.id.clone()).collect()
}

fn arb_event() -> impl Strategy<Value = SelectionEvent> {
    (0usize..6, 0.0f64..=1.0, prop::option::of(0usize..3)).prop_map(|(c, r, tag)| {
        SelectionEvent::new(
            UserId::new("u"),
            CandidateId::new(format!("c{c}")),
            ResonanceState::new(r),
            Utc::now(),
        )
        .with_state_tag(tag.map(|t| format!("tag-{t}")))
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn field_reset_writes_exactly_the_reset_value(pool in arb_pool()) {
        let planner = ActionPlanner::default();
        let actions = vec![HarmonizationAction::FieldReset { reset_to: 0.5, candidates: ids(&pool) }];
        let (updates, _) = planner.weight_updates(&actions, &pool);
        for update in updates {
            prop_assert_eq!(update.candidate.learning_weight(), 0.5);
        }
    }

    #[test]
    fn weight_decay_never_crosses_the_floor(pool in arb_pool()) {
        let planner = ActionPlanner::default();
        let actions = vec![HarmonizationAction::WeightDecay {
            factor: 0.9,
            floor: 0.1,
            candidates: ids(&pool),
        }];
        let (updates, changes) = planner.weight_updates(&actions, &pool);
        for (update, change) in updates.iter().zip(&changes) {
            let w = update.candidate.learning_weight();
            prop_assert!(w >= 0.1);
            prop_assert!(w < change.previous_weight);
        }
    }

    #[test]
    fn entropy_is_zero_below_two_events(event in prop::option::of(arb_event())) {
        let events: Vec<_> = event.into_iter().collect();
        let metrics = EntropyAnalyzer::default().analyze(&events);
        prop_assert_eq!(metrics.overall_entropy, 0.0);
    }

    #[test]
    fn overall_entropy_is_bounded(events in prop::collection::vec(arb_event(), 2..80)) {
        let metrics = EntropyAnalyzer::default().analyze(&events);
        prop_assert!(metrics.overall_entropy >= 0.0);
        prop_assert!(metrics.overall_entropy <= 1.0 + 1e-9);
    }
}
