use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default storage key for the session record.
pub const DEFAULT_SESSION_KEY: &str = "user";

/// Where the session record lives and under which key.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_session_key")]
    pub key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            storage: StorageConfig::default(),
            key: default_session_key(),
        }
    }
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

/// The storage backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema, PartialEq)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// One file per key in `path` (defaults to `~/.wellstride`).
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Kept in process memory only.
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File { path: None }
    }
}
