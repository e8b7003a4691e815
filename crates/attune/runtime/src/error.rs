use attune_feedback::FeedbackError;
use attune_harmonizer::HarmonizerError;
use attune_selection::SelectionError;
use attune_store::StorageError;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by [`AttuneRuntime`](crate::AttuneRuntime) operations.
///
/// Validation and NotFound are rejected before any side effect.
/// ConcurrencyConflict is transient and safe to retry.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("dependency unavailable: {0}")]
    Dependency(String),

    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RuntimeError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_) | Self::Dependency(_))
    }
}

impl From<StorageError> for RuntimeError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(msg) => Self::NotFound(msg),
            StorageError::VersionConflict { .. } => Self::ConcurrencyConflict(e.to_string()),
            StorageError::Timeout { .. } => Self::Dependency(e.to_string()),
            StorageError::InvalidInput(msg) => Self::Validation(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<SelectionError> for RuntimeError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::NoApplicableCandidates { .. } => Self::NotFound(e.to_string()),
            SelectionError::InvalidConfig(msg) => Self::Config(msg),
        }
    }
}

impl From<FeedbackError> for RuntimeError {
    fn from(e: FeedbackError) -> Self {
        match e {
            e if e.is_validation() => Self::Validation(e.to_string()),
            FeedbackError::CandidateNotFound(_) => Self::NotFound(e.to_string()),
            FeedbackError::ConcurrencyConflict { .. } => Self::ConcurrencyConflict(e.to_string()),
            FeedbackError::InvalidConfig(msg) => Self::Config(msg),
            FeedbackError::Storage(inner) => inner.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<HarmonizerError> for RuntimeError {
    fn from(e: HarmonizerError) -> Self {
        match e {
            HarmonizerError::InvalidConfig(msg) => Self::Config(msg),
            HarmonizerError::ConcurrencyConflict { .. } => Self::ConcurrencyConflict(e.to_string()),
            HarmonizerError::Storage(inner) => inner.into(),
        }
    }
}
