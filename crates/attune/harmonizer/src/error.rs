use attune_store::StorageError;

/// Result type for harmonization.
pub type HarmonizerResult<T> = Result<T, HarmonizerError>;

/// Errors from a harmonization cycle.
///
/// A cycle that returns an error has applied no weight mutation.
#[derive(Debug, thiserror::Error)]
pub enum HarmonizerError {
    #[error("invalid harmonizer config: {0}")]
    InvalidConfig(String),
    #[error("harmonization for user {user_id} lost {attempts} CAS races")]
    ConcurrencyConflict { user_id: String, attempts: usize },
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}
