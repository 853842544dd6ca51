use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use guacamole_model::{StateError, StateStore, StoredState};
use tokio::sync::Mutex;

/// [`StateStore`] kept in memory; lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<StoredState>,
    saves: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `state`.
    pub fn with_state(state: StoredState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<StoredState, StateError> {
        Ok(*self.state.lock().await)
    }

    async fn save(&self, state: &StoredState) -> Result<(), StateError> {
        *self.state.lock().await = *state;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
