//! Application startup.
//!
//! Builds the session store from configuration, the two HTTP clients around
//! it and the session controller, which starts from whatever session was
//! persisted.

use std::sync::Arc;

use reqwest::cookie::Jar;
use thiserror::Error;
use tracing::info;

use crate::auth::{session_state_channel, AuthController};
use crate::client::{ApiClient, ClientError, PassThrough, ResponsePolicy, SessionGuard};
use crate::config::ConfigV1;
use crate::features::{GoalsService, WorkoutsService};
use crate::state::AppState;
use crate::store::{create_storage, SessionStore, Storage, StoreError};
use crate::ui::{Navigator, Notifier};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to set up session storage: {0}")]
    Store(#[from] StoreError),
    #[error("failed to set up HTTP client: {0}")]
    Client(#[from] ClientError),
}

/// Build the application state using the storage backend named in `config`.
pub async fn build(
    config: Arc<ConfigV1>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
) -> Result<AppState, StartupError> {
    let storage = create_storage(&config.session.storage)?;
    build_with_storage(config, storage, navigator, notifier).await
}

/// Build the application state on top of an existing storage backend.
///
/// Both clients share one cookie jar, so a session cookie set during an
/// external login is sent by feature requests too. The forced-logout policy
/// shares the controller's state channel.
pub async fn build_with_storage(
    config: Arc<ConfigV1>,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
) -> Result<AppState, StartupError> {
    info!(
        "Using {} session storage, backend at {}",
        storage.name(),
        config.api.base_url
    );
    let session = SessionStore::new(storage, config.session.key.clone());
    let cookies = Arc::new(Jar::default());
    let session_state = session_state_channel();

    let guard: Arc<dyn ResponsePolicy> = Arc::new(
        SessionGuard::new(
            session.clone(),
            navigator.clone(),
            config.auth.exempt_paths.clone(),
            config.auth.login_route.clone(),
        )
        .with_session_state(session_state.clone()),
    );
    let api = ApiClient::new(
        config.api.base_url.clone(),
        session.clone(),
        guard.clone(),
        cookies.clone(),
    )?;

    let direct_policy: Arc<dyn ResponsePolicy> = if config.features.force_logout_on_unauthorized {
        guard
    } else {
        Arc::new(PassThrough)
    };
    let direct = ApiClient::new(
        config.api.base_url.clone(),
        session.clone(),
        direct_policy,
        cookies,
    )?;

    let auth = AuthController::new(
        api.clone(),
        session.clone(),
        navigator,
        notifier,
        config.auth.clone(),
    )
    .with_shared_state(session_state);
    auth.restore().await;

    Ok(AppState {
        goals: GoalsService::new(direct.clone()),
        workouts: WorkoutsService::new(direct.clone()),
        auth: Arc::new(auth),
        config,
        session,
        api,
        direct,
    })
}
