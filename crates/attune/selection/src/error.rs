/// Result type for selection.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors from the Selection Engine.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no applicable candidates for state tag {state_tag:?} (pool size {pool_size})")]
    NoApplicableCandidates {
        state_tag: Option<String>,
        pool_size: usize,
    },
    #[error("invalid selection config: {0}")]
    InvalidConfig(String),
}
