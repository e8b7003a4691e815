use crate::{CandidateStore, StorageError, StorageResult};
use attune_types::{Candidate, CandidateId, VersionedCandidate};
use tracing::debug;

/// Default number of CAS attempts before a conflict is surfaced.
pub const DEFAULT_CAS_ATTEMPTS: usize = 3;

/// Read-modify-CAS loop with a bounded number of attempts.
///
/// `mutate` is re-run against a fresh read after every version conflict, so it
/// must derive the new state only from the candidate it is given. Returns the
/// stored candidate after the successful swap; exhausting `max_attempts`
/// returns the last `VersionConflict`.
pub async fn update_candidate<S, F>(
    store: &S,
    id: &CandidateId,
    max_attempts: usize,
    mut mutate: F,
) -> StorageResult<VersionedCandidate>
where
    S: CandidateStore + ?Sized,
    F: FnMut(&mut Candidate) + Send,
{
    let attempts = max_attempts.max(1);
    let mut last_conflict = None;

    for attempt in 1..=attempts {
        let current = store
            .get_candidate(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("candidate {} not found", id)))?;

        let mut next = current.candidate.clone();
        mutate(&mut next);

        match store.compare_and_swap(current.version, next).await {
            Ok(stored) => return Ok(stored),
            Err(e) if e.is_version_conflict() => {
                debug!(candidate = %id, attempt, "candidate CAS lost a race, re-reading");
                last_conflict = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_conflict.unwrap_or_else(|| {
        StorageError::Backend(format!("no CAS attempt made for candidate {}", id))
    }))
}
