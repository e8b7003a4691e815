//! Property tests: selection only returns candidates applicable to the state.

use attune_selection::{SelectionConfig, SelectionEngine, SelectionRequest};
use attune_types::{Candidate, ResonanceState};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const TAGS: [&str; 3] = ["calm", "anxious", "restless"];

fn arb_candidate(index: usize) -> impl Strategy<Value = Candidate> {
    (
        prop::option::of(prop::sample::select(TAGS.to_vec())),
        0.0f64..=1.0,
        0.0f64..20.0,
        prop::option::of(prop::collection::vec(-1.0f32..1.0, 4)),
    )
        .prop_map(move |(tag, weight, fatigue, pattern)| {
            let mut c = Candidate::new(format!("c{index}"))
                .with_learning_weight(weight)
                .with_fatigue_score(fatigue);
            if let Some(tag) = tag {
                c = c.with_applicability_tag(tag);
            }
            if let Some(pattern) = pattern {
                c = c.with_pattern(pattern);
            }
            c
        })
}

fn arb_pool() -> impl Strategy<Value = Vec<Candidate>> {
    (1usize..12).prop_flat_map(|n| {
        (0..n).map(arb_candidate).collect::<Vec<_>>()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn selected_candidate_applies_to_state(
        pool in arb_pool(),
        state in prop::option::of(prop::sample::select(TAGS.to_vec())),
        resonance in 0.0f64..=1.0,
        embedding in prop::option::of(prop::collection::vec(-1.0f32..1.0, 4)),
        draw in 0.0f64..1.0,
    ) {
        let engine = SelectionEngine::with_default_config();
        let request = SelectionRequest {
            resonance: ResonanceState::new(resonance),
            state_tag: state,
            embedding: embedding.as_deref(),
        };

        let applicable = pool.iter().filter(|c| c.applies_to(state)).count();
        match engine.select(&request, &pool, draw) {
            Ok(decision) => {
                let chosen = pool.iter().find(|c| c.id == decision.selected).unwrap();
                prop_assert!(chosen.applies_to(state));
                prop_assert_eq!(decision.ranked.len(), applicable);
            }
            Err(_) => prop_assert_eq!(applicable, 0),
        }
    }

    #[test]
    fn single_candidate_top_k_is_certain(
        pool in arb_pool(),
        resonance in 0.0f64..=1.0,
        draw in 0.0f64..1.0,
    ) {
        let engine = SelectionEngine::new(SelectionConfig { top_k: 1, ..SelectionConfig::default() }).unwrap();
        let request = SelectionRequest {
            resonance: ResonanceState::new(resonance),
            state_tag: None,
            embedding: None,
        };
        // Only untagged candidates apply when there is no state tag.
        if let Ok(decision) = engine.select(&request, &pool, draw) {
            prop_assert_eq!(&decision.selected, &decision.ranked[0].candidate_id);
            prop_assert!((decision.ranked[0].probability - 1.0).abs() < 1e-12);
        }
    }
}
