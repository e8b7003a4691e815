use attune_store::StorageError;
use attune_types::CandidateId;

/// Result type for feedback processing.
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// Errors from fusion and weight updates.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("self report {0} outside [-1, 1]")]
    InvalidSelfReport(f64),
    #[error("{field} = {value} outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("weight update on {candidate_id} lost {attempts} consecutive CAS races")]
    ConcurrencyConflict {
        candidate_id: CandidateId,
        attempts: usize,
    },
    #[error("invalid feedback config: {0}")]
    InvalidConfig(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FeedbackError {
    /// Input errors that must be rejected without side effects.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSelfReport(_) | Self::OutOfRange { .. })
    }
}
