#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mockito::{Server, ServerGuard};
use wellstride::config::config_from_yaml;
use wellstride::models::{SessionRecord, UserProfile};
use wellstride::startup::build_with_storage;
use wellstride::state::AppState;
use wellstride::store::MemoryStorage;
use wellstride::ui::{History, Notifier};

/// Short enough to keep the suite fast, long enough to observe the gap.
pub const REDIRECT_DELAY_MS: u64 = 200;

/// Notifications in the order they were shown.
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub struct TestApp {
    pub server: ServerGuard,
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub history: Arc<History>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Persist `record` and reload the controller from it, as after a page load.
    pub async fn sign_in_as(&self, record: &SessionRecord) {
        self.state.session.write(record).await.unwrap();
        self.state.auth.restore().await;
    }

    /// Raw value under the session key, bypassing record decoding.
    pub async fn stored_raw(&self) -> Option<String> {
        use wellstride::store::Storage;
        self.storage.get_item("user").await.unwrap()
    }
}

pub fn test_config(base_url: &str, force_logout: bool) -> String {
    format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
session:
  storage:
    type: memory
auth:
  redirect_failure_delay_ms: {REDIRECT_DELAY_MS}
features:
  force_logout_on_unauthorized: {force_logout}
logging:
  level: debug
"#
    )
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(false).await
}

pub async fn spawn_app_with(force_logout: bool) -> TestApp {
    let server = Server::new_async().await;
    let config = config_from_yaml(&test_config(&server.url(), force_logout)).unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let history = Arc::new(History::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let state = build_with_storage(
        Arc::new(config),
        storage.clone(),
        history.clone(),
        notifier.clone(),
    )
    .await
    .unwrap();

    TestApp {
        server,
        state,
        storage,
        history,
        notifier,
    }
}

pub fn record(token: &str, username: &str, roles: &[&str]) -> SessionRecord {
    let roles = roles.iter().map(|r| r.to_string()).collect();
    SessionRecord::new(token).with_identity(UserProfile::new(username, roles))
}
