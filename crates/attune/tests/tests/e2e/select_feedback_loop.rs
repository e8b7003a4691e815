//! End-to-end test: one full select → feedback round trip.

use attune_runtime::{AttuneConfig, FeedbackSubmission, HashEmbedder};
use attune_selection::{ScoringMode, SelectionConfig};
use attune_store::{CandidateStore, EventLog, QueryWindow};
use attune_tests::Harness;
use attune_types::{BehavioralMetrics, BiometricSample, Candidate, CandidateId, UserId, UserState};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn three_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("A").with_learning_weight(0.6),
        Candidate::new("B").with_learning_weight(0.3),
        Candidate::new("C").with_learning_weight(0.2),
    ]
}

fn user() -> UserId {
    UserId::new("user-1")
}

/// Top-1 sampling makes the highest-scored candidate certain.
fn greedy_config() -> AttuneConfig {
    AttuneConfig {
        selection: SelectionConfig {
            top_k: 1,
            ..SelectionConfig::default()
        },
        rng_seed: Some(3),
        ..AttuneConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reference_round_trip() {
    let h = Harness::new(
        greedy_config(),
        three_candidates(),
        vec![UserState::new("user-1", 0.7)],
    );

    let selection = h.runtime.select_candidate(&user(), None, None).await.unwrap();
    assert_eq!(selection.candidate_id, CandidateId::new("A"));
    assert_eq!(selection.resonance.value(), 0.7);

    let a = h.store.get_candidate(&CandidateId::new("A")).await.unwrap().unwrap();
    assert_eq!(a.candidate.fatigue_score(), 1.0);
    assert_eq!(a.candidate.learning_weight(), 0.6);

    let feedback = h
        .runtime
        .submit_feedback(FeedbackSubmission::new("user-1", "A").with_self_report(1.0))
        .await
        .unwrap();
    assert!((feedback.fulfillment_score - 1.0).abs() < 1e-12);
    assert!((feedback.confidence - 0.7).abs() < 1e-12);
    assert!((feedback.new_weight - 0.6425).abs() < 1e-12);

    let a = h.store.get_candidate(&CandidateId::new("A")).await.unwrap().unwrap();
    assert!((a.candidate.learning_weight() - 0.6425).abs() < 1e-12);
    assert_eq!(a.version, 3);

    // Selection and feedback share one per-user sequence.
    let selections = h.store.recent_selections(&user(), 10).await.unwrap();
    let records = h.store.list_feedback(&user(), QueryWindow::latest(10)).await.unwrap();
    assert_eq!(selections[0].sequence, 1);
    assert_eq!(records[0].sequence, 2);
    assert_eq!(records[0].candidate_id, CandidateId::new("A"));
}

#[tokio::test]
async fn corroborated_feedback_is_more_confident() {
    let h = Harness::seeded(three_candidates(), vec![UserState::new("user-1", 0.5)]);

    let alone = h
        .runtime
        .submit_feedback(FeedbackSubmission::new("user-1", "B").with_self_report(0.8))
        .await
        .unwrap();

    let corroborated = h
        .runtime
        .submit_feedback(
            FeedbackSubmission::new("user-1", "C")
                .with_self_report(0.8)
                .with_behavioral(BehavioralMetrics {
                    completion_rate: Some(0.9),
                    ..BehavioralMetrics::default()
                })
                .with_biometric(BiometricSample::new("interaction", 0.9, 1.0)),
        )
        .await
        .unwrap();

    assert!((alone.fulfillment_score - 0.8).abs() < 1e-12);
    assert!(corroborated.confidence > alone.confidence);
}

#[tokio::test]
async fn empty_feedback_leaves_weight_unchanged() {
    let h = Harness::seeded(three_candidates(), vec![UserState::new("user-1", 0.5)]);
    let outcome = h
        .runtime
        .submit_feedback(FeedbackSubmission::new("user-1", "B"))
        .await
        .unwrap();
    assert_eq!(outcome.fulfillment_score, 0.0);
    assert_eq!(outcome.confidence, 0.0);
    assert_eq!(outcome.weight_delta, 0.0);
    assert_eq!(outcome.new_weight, 0.3);
}

#[tokio::test]
async fn tagged_pool_never_leaks_across_states() {
    let candidates = vec![
        Candidate::new("calm-1").with_applicability_tag("calm").with_learning_weight(1.0),
        Candidate::new("anxious-1").with_applicability_tag("anxious"),
        Candidate::new("any-1"),
    ];
    let h = Harness::seeded(
        candidates,
        vec![UserState::new("user-1", 0.4).with_state_tag("anxious")],
    );
    for _ in 0..30 {
        let outcome = h.runtime.select_candidate(&user(), None, None).await.unwrap();
        assert_ne!(outcome.candidate_id, CandidateId::new("calm-1"));
    }
}

#[tokio::test]
async fn text_signal_drives_vectorized_scoring() {
    let embedder = HashEmbedder::new(16);
    let candidates = vec![
        Candidate::new("match").with_pattern(embedder.embed_sync("slow down and breathe")),
        Candidate::new("other").with_pattern(embedder.embed_sync("go for a run")),
    ];
    let h = Harness::new(greedy_config(), candidates, vec![UserState::new("user-1", 0.5)]);
    let runtime = Arc::try_unwrap(h.runtime)
        .unwrap_or_else(|_| panic!("runtime still shared"))
        .with_embedder(Arc::new(embedder));

    let outcome = runtime
        .select_candidate(&user(), None, Some("slow down and breathe"))
        .await
        .unwrap();
    assert_eq!(outcome.candidate_id, CandidateId::new("match"));
    assert_eq!(outcome.mode, ScoringMode::Vectorized);
}
