//! File-backed [`StateStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use guacamole_model::{StateError, StateStore, StoredState};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Stores the operator state as JSON in a file.
///
/// Writes go to a sibling temporary file that is flushed to disk and then
/// renamed over the target, so a crash never leaves a truncated state file
/// behind.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<StoredState, StateError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file yet, using defaults");
                Ok(StoredState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    async fn save(&self, state: &StoredState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        let temp = self.temp_path();
        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(db_initialized = state.db_initialized, "State saved");
        Ok(())
    }
}
