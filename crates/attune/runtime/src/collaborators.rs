//! Consumed collaborator seams.

use crate::error::{RuntimeError, RuntimeResult};
use async_trait::async_trait;
use attune_types::{UserId, UserState};
use std::collections::HashMap;
use std::sync::RwLock;

/// Read-only source of a user's current state.
#[async_trait]
pub trait UserStateStore: Send + Sync {
    async fn user_state(&self, user_id: &UserId) -> RuntimeResult<Option<UserState>>;
}

/// Opaque text-to-vector service.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> RuntimeResult<Vec<f32>>;
}

/// In-memory user state table.
#[derive(Default)]
pub struct InMemoryUserStateStore {
    states: RwLock<HashMap<UserId, UserState>>,
}

impl InMemoryUserStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the state of `state.user_id`.
    pub fn upsert(&self, state: UserState) -> RuntimeResult<()> {
        let mut guard = self
            .states
            .write()
            .map_err(|_| RuntimeError::Dependency("user state lock poisoned".into()))?;
        guard.insert(state.user_id.clone(), state);
        Ok(())
    }
}

#[async_trait]
impl UserStateStore for InMemoryUserStateStore {
    async fn user_state(&self, user_id: &UserId) -> RuntimeResult<Option<UserState>> {
        let guard = self
            .states
            .read()
            .map_err(|_| RuntimeError::Dependency("user state lock poisoned".into()))?;
        Ok(guard.get(user_id).cloned())
    }
}
