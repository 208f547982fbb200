use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::{file_store::FileStorage, memory_store::MemoryStorage};
use crate::config::StorageConfig;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no home directory available for the session store")]
    NoHomeDir,
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The Storage trait abstracts durable string key-value storage
/// (get, set, remove), the way a browser's local storage behaves.
#[async_trait]
pub trait Storage: Send + Sync {
    fn name(&self) -> &str;
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StoreError> {
    match config {
        StorageConfig::File { path } => {
            let dir = resolve_dir(path.as_deref())?;
            info!("Using file storage at {}", dir.display());
            Ok(Arc::new(FileStorage::new(dir)))
        }
        StorageConfig::Memory => {
            info!("Using in-memory storage; sessions will not survive a restart.");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

/// Expand a leading `~` and fall back to `~/.wellstride`.
fn resolve_dir(path: Option<&Path>) -> Result<PathBuf, StoreError> {
    let home = || dirs::home_dir().ok_or(StoreError::NoHomeDir);
    match path {
        None => Ok(home()?.join(".wellstride")),
        Some(p) => match p.strip_prefix("~") {
            Ok(rest) => Ok(home()?.join(rest)),
            Err(_) => Ok(p.to_path_buf()),
        },
    }
}
