//! End-to-end test: failing collaborators either degrade or surface.
//!
//! Embedding and event log failures are logged and counted; a stalled
//! candidate store fails the request fast as a dependency error.

use async_trait::async_trait;
use attune_runtime::{
    AttuneConfig, AttuneRuntime, EmbeddingService, FeedbackSubmission, InMemoryUserStateStore,
    RuntimeError, RuntimeResult,
};
use attune_store::{
    CandidateStore, CasUpdate, EventLog, InMemoryAttuneStore, QueryWindow, StorageError,
    StorageResult,
};
use attune_types::{
    Candidate, CandidateId, FeedbackRecord, HarmonizationEvent, SelectionEvent, UserId, UserState,
    VersionedCandidate,
};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Candidate store that works and an event log that rejects every append.
/// With `stall_reads`, candidate listing never completes.
struct FlakyStore {
    inner: InMemoryAttuneStore,
    stall_reads: bool,
}

impl FlakyStore {
    fn new(stall_reads: bool) -> Self {
        Self {
            inner: InMemoryAttuneStore::with_candidates(vec![
                Candidate::new("a").with_learning_weight(0.5)
            ])
            .unwrap(),
            stall_reads,
        }
    }
}

#[async_trait]
impl CandidateStore for FlakyStore {
    async fn insert_candidate(&self, c: Candidate) -> StorageResult<VersionedCandidate> {
        self.inner.insert_candidate(c).await
    }
    async fn get_candidate(&self, id: &CandidateId) -> StorageResult<Option<VersionedCandidate>> {
        self.inner.get_candidate(id).await
    }
    async fn list_candidates(&self) -> StorageResult<Vec<VersionedCandidate>> {
        if self.stall_reads {
            std::future::pending::<()>().await;
        }
        self.inner.list_candidates().await
    }
    async fn compare_and_swap(&self, v: u64, c: Candidate) -> StorageResult<VersionedCandidate> {
        self.inner.compare_and_swap(v, c).await
    }
    async fn compare_and_swap_many(
        &self,
        updates: Vec<CasUpdate>,
    ) -> StorageResult<Vec<VersionedCandidate>> {
        self.inner.compare_and_swap_many(updates).await
    }
}

fn log_down() -> StorageError {
    StorageError::Backend("event log unavailable".into())
}

#[async_trait]
impl EventLog for FlakyStore {
    async fn append_selection(&self, _e: SelectionEvent) -> StorageResult<SelectionEvent> {
        Err(log_down())
    }
    async fn append_feedback(&self, _r: FeedbackRecord) -> StorageResult<FeedbackRecord> {
        Err(log_down())
    }
    async fn append_harmonization(
        &self,
        _e: HarmonizationEvent,
    ) -> StorageResult<HarmonizationEvent> {
        Err(log_down())
    }
    async fn recent_selections(&self, u: &UserId, n: usize) -> StorageResult<Vec<SelectionEvent>> {
        self.inner.recent_selections(u, n).await
    }
    async fn last_harmonization(&self, u: &UserId) -> StorageResult<Option<HarmonizationEvent>> {
        self.inner.last_harmonization(u).await
    }
    async fn list_feedback(&self, u: &UserId, w: QueryWindow) -> StorageResult<Vec<FeedbackRecord>> {
        self.inner.list_feedback(u, w).await
    }
    async fn list_harmonizations(
        &self,
        u: &UserId,
        w: QueryWindow,
    ) -> StorageResult<Vec<HarmonizationEvent>> {
        self.inner.list_harmonizations(u, w).await
    }
}

struct DownEmbedder;

#[async_trait]
impl EmbeddingService for DownEmbedder {
    async fn embed(&self, _text: &str) -> RuntimeResult<Vec<f32>> {
        Err(RuntimeError::Dependency("embedding service returned 503".into()))
    }
}

fn runtime_over(store: FlakyStore) -> AttuneRuntime {
    let users = Arc::new(InMemoryUserStateStore::new());
    users.upsert(UserState::new("user-1", 0.6)).unwrap();
    let config = AttuneConfig {
        io_timeout_ms: 50,
        rng_seed: Some(1),
        ..AttuneConfig::default()
    };
    AttuneRuntime::new(config, Arc::new(store), users)
        .unwrap()
        .with_embedder(Arc::new(DownEmbedder))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_log_and_embedding_failures_do_not_fail_requests() {
    let runtime = runtime_over(FlakyStore::new(false));
    let user = UserId::new("user-1");

    let selection = runtime
        .select_candidate(&user, None, Some("restless evening"))
        .await
        .unwrap();
    assert_eq!(selection.candidate_id, CandidateId::new("a"));

    let feedback = runtime
        .submit_feedback(FeedbackSubmission::new("user-1", "a").with_self_report(0.5))
        .await
        .unwrap();
    assert!(feedback.new_weight > 0.5);

    let cycle = runtime.run_harmonization_cycle(&user, true).await.unwrap();
    assert!(!cycle.report().unwrap().recorded);

    let metrics = runtime.metrics();
    assert_eq!(metrics.degraded_embeddings, 1);
    assert_eq!(metrics.event_log_failures, 3);
    assert_eq!(metrics.selections, 1);
    assert_eq!(metrics.feedback_submissions, 1);
}

#[tokio::test]
async fn stalled_store_fails_fast() {
    let runtime = runtime_over(FlakyStore::new(true));
    let err = runtime
        .select_candidate(&UserId::new("user-1"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Dependency(_)));
    assert!(err.is_transient());
}
