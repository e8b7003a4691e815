//! End-to-end test: concurrent feedback on one candidate loses no update.

use attune_feedback::{UpdaterConfig, WeightUpdater};
use attune_runtime::{AttuneConfig, FeedbackSubmission};
use attune_tests::Harness;
use attune_types::{Candidate, CandidateId, UserState};

const WRITERS: usize = 16;

fn contended_config() -> AttuneConfig {
    AttuneConfig {
        updater: UpdaterConfig {
            max_cas_attempts: 1_000,
            ..UpdaterConfig::default()
        },
        rng_seed: Some(5),
        ..AttuneConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_match_sequential_result() {
    let h = Harness::new(
        contended_config(),
        vec![Candidate::new("shared").with_learning_weight(0.1)],
        (0..WRITERS)
            .map(|i| UserState::new(format!("user-{i}"), 0.5))
            .collect(),
    );

    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let runtime = h.runtime.clone();
        handles.push(tokio::spawn(async move {
            runtime
                .submit_feedback(
                    FeedbackSubmission::new(format!("user-{i}"), "shared").with_self_report(1.0),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let updater = WeightUpdater::default();
    let expected = (0..WRITERS).fold(0.1, |w, _| updater.step(w, 1.0, 0.7).new_weight);

    let stored = h.runtime.candidate(&CandidateId::new("shared")).await.unwrap();
    assert!((stored.candidate.learning_weight() - expected).abs() < 1e-9);
    assert_eq!(stored.version, 1 + WRITERS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_selections_count_every_fatigue_bump() {
    let mut config = contended_config();
    config.selection.top_k = 1;
    let h = Harness::new(
        config,
        vec![Candidate::new("only")],
        vec![UserState::new("user-1", 0.5)],
    );

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let runtime = h.runtime.clone();
        handles.push(tokio::spawn(async move {
            runtime
                .select_candidate(&"user-1".into(), None, None)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = h.runtime.candidate(&CandidateId::new("only")).await.unwrap();
    assert_eq!(stored.candidate.fatigue_score(), WRITERS as f64);
}
