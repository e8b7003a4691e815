//! In-memory reference implementation of the Attune storage traits.
//!
//! Deterministic and test-friendly. A single lock per table makes every CAS
//! and every batch CAS atomic with respect to other writers.

use crate::traits::{CandidateStore, CasUpdate, EventLog, QueryWindow};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use attune_types::{
    Candidate, CandidateId, FeedbackRecord, HarmonizationEvent, SelectionEvent, UserId,
    VersionedCandidate,
};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Per-user record streams sharing one sequence counter.
#[derive(Default)]
struct UserStream {
    next_sequence: u64,
    selections: Vec<SelectionEvent>,
    feedback: Vec<FeedbackRecord>,
    harmonizations: Vec<HarmonizationEvent>,
}

impl UserStream {
    fn assign_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }
}

/// In-memory Attune storage adapter.
#[derive(Default)]
pub struct InMemoryAttuneStore {
    candidates: RwLock<HashMap<CandidateId, VersionedCandidate>>,
    streams: RwLock<HashMap<UserId, UserStream>>,
}

impl InMemoryAttuneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with candidates, e.g. from a catalog file.
    pub fn with_candidates(candidates: impl IntoIterator<Item = Candidate>) -> StorageResult<Self> {
        let store = Self::new();
        {
            let mut guard = store
                .candidates
                .write()
                .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;
            for candidate in candidates {
                let candidate = candidate.normalized();
                if guard.contains_key(&candidate.id) {
                    return Err(StorageError::Conflict(format!(
                        "candidate {} already exists",
                        candidate.id
                    )));
                }
                guard.insert(
                    candidate.id.clone(),
                    VersionedCandidate {
                        candidate,
                        version: 1,
                    },
                );
            }
        }
        Ok(store)
    }
}

#[async_trait]
impl CandidateStore for InMemoryAttuneStore {
    async fn insert_candidate(&self, candidate: Candidate) -> StorageResult<VersionedCandidate> {
        let mut guard = self
            .candidates
            .write()
            .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;

        if guard.contains_key(&candidate.id) {
            return Err(StorageError::Conflict(format!(
                "candidate {} already exists",
                candidate.id
            )));
        }

        let record = VersionedCandidate {
            candidate: candidate.normalized(),
            version: 1,
        };
        guard.insert(record.candidate.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_candidate(&self, id: &CandidateId) -> StorageResult<Option<VersionedCandidate>> {
        let guard = self
            .candidates
            .read()
            .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_candidates(&self) -> StorageResult<Vec<VersionedCandidate>> {
        let guard = self
            .candidates
            .read()
            .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;
        let mut values = guard.values().cloned().collect::<Vec<_>>();
        values.sort_by(|a, b| a.candidate.id.cmp(&b.candidate.id));
        Ok(values)
    }

    async fn compare_and_swap(
        &self,
        expected_version: u64,
        candidate: Candidate,
    ) -> StorageResult<VersionedCandidate> {
        let mut guard = self
            .candidates
            .write()
            .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;
        swap_one(&mut guard, expected_version, candidate)
    }

    async fn compare_and_swap_many(
        &self,
        updates: Vec<CasUpdate>,
    ) -> StorageResult<Vec<VersionedCandidate>> {
        let mut guard = self
            .candidates
            .write()
            .map_err(|_| StorageError::Backend("candidates lock poisoned".to_string()))?;

        // Validate the whole batch before touching anything.
        let mut seen = HashSet::new();
        for update in &updates {
            if !seen.insert(update.candidate.id.clone()) {
                return Err(StorageError::InvalidInput(format!(
                    "candidate {} appears twice in one batch",
                    update.candidate.id
                )));
            }
            check_version(&guard, &update.candidate.id, update.expected_version)?;
        }

        updates
            .into_iter()
            .map(|update| swap_one(&mut guard, update.expected_version, update.candidate))
            .collect()
    }
}

fn check_version(
    table: &HashMap<CandidateId, VersionedCandidate>,
    id: &CandidateId,
    expected_version: u64,
) -> StorageResult<()> {
    let current = table
        .get(id)
        .ok_or_else(|| StorageError::NotFound(format!("candidate {} not found", id)))?;
    if current.version != expected_version {
        return Err(StorageError::VersionConflict {
            candidate_id: id.clone(),
            expected: expected_version,
            current: current.version,
        });
    }
    Ok(())
}

fn swap_one(
    table: &mut HashMap<CandidateId, VersionedCandidate>,
    expected_version: u64,
    candidate: Candidate,
) -> StorageResult<VersionedCandidate> {
    check_version(table, &candidate.id, expected_version)?;
    let record = VersionedCandidate {
        candidate: candidate.normalized(),
        version: expected_version + 1,
    };
    table.insert(record.candidate.id.clone(), record.clone());
    Ok(record)
}

#[async_trait]
impl EventLog for InMemoryAttuneStore {
    async fn append_selection(&self, mut event: SelectionEvent) -> StorageResult<SelectionEvent> {
        let mut guard = self
            .streams
            .write()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let stream = guard.entry(event.user_id.clone()).or_default();
        event.sequence = stream.assign_sequence();
        stream.selections.push(event.clone());
        Ok(event)
    }

    async fn append_feedback(&self, mut record: FeedbackRecord) -> StorageResult<FeedbackRecord> {
        let mut guard = self
            .streams
            .write()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let stream = guard.entry(record.user_id.clone()).or_default();
        record.sequence = stream.assign_sequence();
        stream.feedback.push(record.clone());
        Ok(record)
    }

    async fn append_harmonization(
        &self,
        mut event: HarmonizationEvent,
    ) -> StorageResult<HarmonizationEvent> {
        let mut guard = self
            .streams
            .write()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let stream = guard.entry(event.user_id.clone()).or_default();
        event.sequence = stream.assign_sequence();
        stream.harmonizations.push(event.clone());
        Ok(event)
    }

    async fn recent_selections(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> StorageResult<Vec<SelectionEvent>> {
        let guard = self
            .streams
            .read()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let Some(stream) = guard.get(user_id) else {
            return Ok(Vec::new());
        };
        let skip = stream.selections.len().saturating_sub(limit);
        Ok(stream.selections[skip..].to_vec())
    }

    async fn last_harmonization(
        &self,
        user_id: &UserId,
    ) -> StorageResult<Option<HarmonizationEvent>> {
        let guard = self
            .streams
            .read()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        Ok(guard
            .get(user_id)
            .and_then(|stream| stream.harmonizations.last().cloned()))
    }

    async fn list_feedback(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<FeedbackRecord>> {
        let guard = self
            .streams
            .read()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let values = guard
            .get(user_id)
            .map(|stream| stream.feedback.iter().rev().cloned().collect())
            .unwrap_or_default();
        Ok(apply_window(values, window))
    }

    async fn list_harmonizations(
        &self,
        user_id: &UserId,
        window: QueryWindow,
    ) -> StorageResult<Vec<HarmonizationEvent>> {
        let guard = self
            .streams
            .read()
            .map_err(|_| StorageError::Backend("event log lock poisoned".to_string()))?;
        let values = guard
            .get(user_id)
            .map(|stream| stream.harmonizations.iter().rev().cloned().collect())
            .unwrap_or_default();
        Ok(apply_window(values, window))
    }
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
