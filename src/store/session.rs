use std::sync::Arc;

use tracing::{debug, error, warn};

use super::base::{Storage, StoreError};
use crate::models::SessionRecord;

/// The persisted session: one serialized `SessionRecord` under a fixed key.
///
/// Reads never fail. Unreadable or malformed content is logged and reported
/// as "no session", so a corrupted file can never lock the user out.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        SessionStore {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn read(&self) -> Option<SessionRecord> {
        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Error reading session from {} storage: {}", self.storage.name(), e);
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring malformed session record under '{}': {}", self.key, e);
                None
            }
        }
    }

    pub async fn write(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(record)?;
        self.storage.set_item(&self.key, &encoded).await?;
        debug!("Persisted session record for {:?}", record.username());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_item(&self.key).await
    }
}
