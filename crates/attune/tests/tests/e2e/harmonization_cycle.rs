//! End-to-end test: harmonization guard, corrective actions and history.

use attune_harmonizer::HarmonizationOutcome;
use attune_runtime::AttuneConfig;
use attune_store::{CandidateStore, EventLog, QueryWindow};
use attune_tests::{t0, Harness};
use attune_types::{
    Candidate, CandidateId, ResonanceState, SelectionEvent, StabilityStatus, UserId, UserState,
};
use chrono::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user() -> UserId {
    UserId::new("user-1")
}

fn harness() -> Harness {
    Harness::new(
        AttuneConfig::default(),
        vec![
            Candidate::new("a").with_learning_weight(0.9),
            Candidate::new("b").with_learning_weight(0.15),
            Candidate::new("c").with_learning_weight(0.7),
            Candidate::new("d").with_learning_weight(0.35),
            Candidate::new("quiet").with_learning_weight(0.8),
        ],
        vec![UserState::new("user-1", 0.5)],
    )
}

/// Every selection lands in a different state and profile while resonance
/// swings between the extremes.
async fn record_chaotic_history(h: &Harness) {
    for (i, id) in ["a", "b", "c", "d"].into_iter().enumerate() {
        let resonance = if i % 2 == 0 { 0.0 } else { 1.0 };
        let event = SelectionEvent::new(
            user(),
            CandidateId::new(id),
            ResonanceState::new(resonance),
            t0(),
        )
        .with_state_tag(Some(format!("state-{i}")))
        .with_profile(Some(format!("profile-{i}")));
        h.store.append_selection(event).await.unwrap();
    }
}

async fn weight(h: &Harness, id: &str) -> f64 {
    h.store
        .get_candidate(&CandidateId::new(id))
        .await
        .unwrap()
        .unwrap()
        .candidate
        .learning_weight()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quiet_history_is_stable() {
    let h = harness();
    let outcome = h.runtime.run_harmonization_cycle(&user(), false).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.status(), StabilityStatus::Stable);
    assert_eq!(report.metrics().overall_entropy, 0.0);
    assert!(report.actions().is_empty());
}

#[tokio::test]
async fn critical_history_resets_touched_candidates() {
    let h = harness();
    record_chaotic_history(&h).await;

    let outcome = h.runtime.run_harmonization_cycle(&user(), true).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.status(), StabilityStatus::Critical);
    assert!(report.event.forced);

    for id in ["a", "b", "c", "d"] {
        assert_eq!(weight(&h, id).await, 0.5);
    }
    assert_eq!(weight(&h, "quiet").await, 0.8);
}

#[tokio::test]
async fn guard_interval_blocks_then_releases() {
    let h = harness();
    h.runtime.run_harmonization_cycle(&user(), false).await.unwrap();
    record_chaotic_history(&h).await;

    h.clock.advance(Duration::hours(1));
    let outcome = h.runtime.run_harmonization_cycle(&user(), false).await.unwrap();
    match outcome {
        HarmonizationOutcome::NotDue { last_run, next_due } => {
            assert_eq!(last_run, t0());
            assert_eq!(next_due, t0() + Duration::hours(24));
        }
        HarmonizationOutcome::Executed(_) => panic!("cycle ran inside the guard interval"),
    }
    assert_eq!(weight(&h, "a").await, 0.9);

    h.clock.advance(Duration::hours(24));
    let outcome = h.runtime.run_harmonization_cycle(&user(), false).await.unwrap();
    assert!(outcome.is_executed());
    assert_eq!(weight(&h, "a").await, 0.5);

    let history = h
        .runtime
        .harmonization_history(&user(), QueryWindow::latest(10))
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, StabilityStatus::Critical);
    assert_eq!(history[1].status, StabilityStatus::Stable);

    let metrics = h.runtime.metrics();
    assert_eq!(metrics.harmonization_cycles, 2);
    assert_eq!(metrics.skipped_cycles, 1);
}

#[tokio::test]
async fn users_are_harmonized_independently() {
    let h = harness();
    h.users.upsert(UserState::new("user-2", 0.5)).unwrap();
    record_chaotic_history(&h).await;

    let user_one = user();
    let user_two = UserId::new("user-2");
    let (one, two) = tokio::join!(
        h.runtime.run_harmonization_cycle(&user_one, false),
        h.runtime.run_harmonization_cycle(&user_two, false),
    );
    assert_eq!(one.unwrap().report().unwrap().status(), StabilityStatus::Critical);
    assert_eq!(two.unwrap().report().unwrap().status(), StabilityStatus::Stable);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_cycles_for_one_user_record_once() {
    let h = harness();
    record_chaotic_history(&h).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let runtime = h.runtime.clone();
        handles.push(tokio::spawn(async move {
            let user = user();
            runtime.run_harmonization_cycle(&user, false).await
        }));
    }
    let mut executed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_executed() {
            executed += 1;
        }
    }
    assert_eq!(executed, 1);

    let history = h
        .runtime
        .harmonization_history(&user(), QueryWindow::latest(10))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(weight(&h, "a").await, 0.5);

    let metrics = h.runtime.metrics();
    assert_eq!(metrics.harmonization_cycles, 1);
    assert_eq!(metrics.skipped_cycles, 7);
}
