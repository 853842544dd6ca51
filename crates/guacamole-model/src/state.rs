//! State persisted across operator invocations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised by a [`StateStore`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Reading or writing the backing storage failed.
    #[error("State storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored state could not be decoded.
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Operator state that must survive restarts of the operator process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    /// Set once the database schema has been created.
    #[serde(default)]
    pub db_initialized: bool,
}

/// Durable storage for [`StoredState`].
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the state, returning the default when nothing was stored yet.
    async fn load(&self) -> Result<StoredState, StateError>;

    /// Persists the state. Must be durable once it returns `Ok`.
    async fn save(&self, state: &StoredState) -> Result<(), StateError>;
}
