//! Storage adapter that bounds every call with a timeout.

use async_trait::async_trait;
use attune_store::{
    AttuneStore, CandidateStore, CasUpdate, EventLog, QueryWindow, StorageError, StorageResult,
};
use attune_types::{
    Candidate, CandidateId, FeedbackRecord, HarmonizationEvent, SelectionEvent, UserId,
    VersionedCandidate,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Wraps a store so that a slow backend fails fast with
/// [`StorageError::Timeout`] instead of stalling a request.
#[derive(Clone)]
pub struct TimedStore {
    inner: Arc<dyn AttuneStore>,
    timeout: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn AttuneStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &Arc<dyn AttuneStore> {
        &self.inner
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                operation,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl CandidateStore for TimedStore {
    async fn insert_candidate(&self, candidate: Candidate) -> StorageResult<VersionedCandidate> {
        self.bounded("insert_candidate", self.inner.insert_candidate(candidate))
            .await
    }

    async fn get_candidate(&self, id: &CandidateId) -> StorageResult<Option<VersionedCandidate>> {
        self.bounded("get_candidate", self.inner.get_candidate(id)).await
    }

    async fn list_candidates(&self) -> StorageResult<Vec<VersionedCandidate>> {
        self.bounded("list_candidates", self.inner.list_candidates())
            .await
    }

    async fn compare_and_swap(
        &self,
        expected_version: u64,
        candidate: Candidate,
    ) -> StorageResult<VersionedCandidate> {
        self.bounded(
            "compare_and_swap",
            self.inner.compare_and_swap(expected_version, candidate),
        )
        .await
    }

    async fn compare_and_swap_many(
        &self,
        updates: Vec<CasUpdate>,
    ) -> StorageResult<Vec<VersionedCandidate>> {
        self.bounded(
            "compare_and_swap_many",
            self.inner.compare_and_swap_many(updates),
        )
        .await
    }
}

#[async_trait]
impl EventLog for TimedStore {
    async fn append_selection(&self, event: SelectionEvent) -> StorageResult<SelectionEvent> {
        self.bounded("append_selection", self.inner.append_selection(event))
            .await
    }

    async fn append_feedback(&self, record: FeedbackRecord) -> StorageResult<FeedbackRecord> {
        self.bounded("append_feedback", self.inner.append_feedback(record))
            .await
    }

    async fn append_harmonization(
        &self,
        event: HarmonizationEvent,
    ) -> StorageResult<HarmonizationEvent> {
        self.bounded(
            "append_harmonization",
            self.inner.append_harmonization(event),
        )
        .await
    }

    async fn recent_selections(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> StorageResult<Vec<SelectionEvent>> {
        self.bounded(
            "recent_selections",
            self.inner.recent_selections(user_id, limit),
        )
        .await
    }

    async fn last_harmonization(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Option<HarmonizationEvent>> {
        self.bounded("last_harmonization", self.inner.last_harmonization(user_id))
            .await
    }

    async fn list_feedback(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<FeedbackRecord>> {
        self.bounded("list_feedback", self.inner.list_feedback(user_id, window))
            .await
    }

    async fn list_harmonizations(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<HarmonizationEvent>> {
        self.bounded(
            "list_harmonizations",
            self.inner.list_harmonizations(user_id, window),
        )
        .await
    }
}
