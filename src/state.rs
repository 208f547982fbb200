//! Shared application state.
//!
//! Everything a host needs after startup: the two HTTP clients, the session
//! controller and the feature services, all sharing one session store.

use std::sync::Arc;

use crate::auth::AuthController;
use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::features::{GoalsService, WorkoutsService};
use crate::store::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub session: SessionStore,
    /// Client with the forced-logout policy, used for auth requests.
    pub api: ApiClient,
    /// Client used by the feature services.
    pub direct: ApiClient,
    pub auth: Arc<AuthController>,
    pub goals: GoalsService,
    pub workouts: WorkoutsService,
}
