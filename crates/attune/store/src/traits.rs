use crate::StorageResult;
use async_trait::async_trait;
use attune_types::{
    Candidate, CandidateId, FeedbackRecord, HarmonizationEvent, SelectionEvent, UserId,
    VersionedCandidate,
};

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn latest(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }
}

/// One entry of a batch compare-and-swap.
#[derive(Debug, Clone)]
pub struct CasUpdate {
    pub expected_version: u64,
    pub candidate: Candidate,
}

/// Versioned repository of candidates.
///
/// Writers must present the version they read; a stale version yields
/// [`StorageError::VersionConflict`](crate::StorageError::VersionConflict).
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Register a newly authored candidate at version 1.
    async fn insert_candidate(&self, candidate: Candidate) -> StorageResult<VersionedCandidate>;

    async fn get_candidate(&self, id: &CandidateId) -> StorageResult<Option<VersionedCandidate>>;

    /// All candidates ordered by id.
    async fn list_candidates(&self) -> StorageResult<Vec<VersionedCandidate>>;

    /// Replace the candidate if its current version equals `expected_version`.
    async fn compare_and_swap(
        &self,
        expected_version: u64,
        candidate: Candidate,
    ) -> StorageResult<VersionedCandidate>;

    /// Apply every update or none of them.
    async fn compare_and_swap_many(
        &self,
        updates: Vec<CasUpdate>,
    ) -> StorageResult<Vec<VersionedCandidate>>;
}

/// Append-only sink and reader for the three record types.
///
/// The log assigns `sequence` numbers from one counter per user, so a user's
/// records are totally ordered regardless of record type.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append_selection(&self, event: SelectionEvent) -> StorageResult<SelectionEvent>;

    async fn append_feedback(&self, record: FeedbackRecord) -> StorageResult<FeedbackRecord>;

    async fn append_harmonization(
        &self,
        event: HarmonizationEvent,
    ) -> StorageResult<HarmonizationEvent>;

    /// The last `limit` selections of a user, oldest first.
    async fn recent_selections(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> StorageResult<Vec<SelectionEvent>>;

    async fn last_harmonization(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Option<HarmonizationEvent>>;

    /// Feedback records newest-first.
    async fn list_feedback(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<FeedbackRecord>>;

    /// Harmonization events newest-first.
    async fn list_harmonizations(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<HarmonizationEvent>>;
}

/// Unified storage bundle used by the runtime.
pub trait AttuneStore: CandidateStore + EventLog + Send + Sync {}

impl<T> AttuneStore for T where T: CandidateStore + EventLog + Send + Sync {}
