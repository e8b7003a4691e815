//! Property tests: learning weights stay in [0, 1] under any feedback stream.

use attune_runtime::FeedbackSubmission;
use attune_tests::Harness;
use attune_types::{BehavioralMetrics, BiometricSample, Candidate, UserState};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_behavioral() -> impl Strategy<Value = Option<BehavioralMetrics>> {
    prop::option::of(
        (
            prop::option::of(0.0f64..=1.0),
            prop::option::of(0u32..10),
            prop::option::of(0.0f64..600.0),
            prop::option::of(0.0f64..=1.0),
        )
            .prop_map(|(completion, revisits, dwell, focus)| BehavioralMetrics {
                completion_rate: completion,
                revisit_count: revisits,
                dwell_time_secs: dwell,
                scroll_depth: None,
                focus_ratio: focus,
            }),
    )
}

fn arb_biometric() -> impl Strategy<Value = BiometricSample> {
    (
        prop_oneof![
            Just(("hrv", 0.0f64, 150.0f64)),
            Just(("breath_rate", 0.0, 30.0)),
            Just(("galvanic", 0.0, 40.0)),
            Just(("motion", 0.0, 20.0)),
        ],
        0.0f64..=1.0,
        0.0f64..=1.0,
    )
        .prop_map(|((kind, lo, hi), t, confidence)| {
            BiometricSample::new(kind, lo + t * (hi - lo), confidence)
        })
}

/// (candidate index, submission parts)
fn arb_feedback() -> impl Strategy<Value = (usize, Option<f64>, Option<BehavioralMetrics>, Vec<BiometricSample>)> {
    (
        0usize..3,
        prop::option::of(-1.0f64..=1.0),
        arb_behavioral(),
        prop::collection::vec(arb_biometric(), 0..3),
    )
}

fn run<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn weights_stay_in_unit_range(
        initial in prop::collection::vec(0.0f64..=1.0, 3),
        stream in prop::collection::vec(arb_feedback(), 1..40),
    ) {
        let ids = ["c0", "c1", "c2"];
        let h = Harness::seeded(
            ids.iter()
                .zip(&initial)
                .map(|(id, w)| Candidate::new(*id).with_learning_weight(*w))
                .collect(),
            vec![UserState::new("u", 0.5)],
        );

        let weights = run(async {
            for (idx, self_report, behavioral, biometrics) in stream {
                let mut submission = FeedbackSubmission::new("u", ids[idx]);
                submission.self_report = self_report;
                submission.behavioral = behavioral;
                submission.biometrics = biometrics;
                h.runtime.submit_feedback(submission).await.unwrap();
            }
            h.runtime
                .candidates()
                .await
                .unwrap()
                .into_iter()
                .map(|v| v.candidate.learning_weight())
                .collect::<Vec<_>>()
        });

        for w in weights {
            prop_assert!((0.0..=1.0).contains(&w), "weight {} escaped [0, 1]", w);
        }
    }
}
