//! What happens after a request fails. Every failure is logged by the client
//! itself; a policy decides on any further side effects.

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use tracing::{error, info};

use crate::auth::{SessionState, SharedSessionState};
use crate::store::SessionStore;
use crate::ui::{Navigation, Navigator};

/// Authentication endpoints where a 401 means "wrong password" rather than
/// "session expired". Matched as substrings of the request URL.
pub const DEFAULT_EXEMPT_PATHS: [&str; 6] = [
    "/api/auth/signin",
    "/api/auth/signup",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
    "/oauth2/authorization",
    "/oauth2/redirect",
];

/// A failed request as seen by a policy.
#[derive(Debug)]
pub struct RequestFailure<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    /// `None` when no response arrived at all.
    pub status: Option<StatusCode>,
    /// The caller marked this request as part of an authentication flow.
    pub exempt: bool,
}

#[async_trait]
pub trait ResponsePolicy: Send + Sync {
    fn name(&self) -> &str;
    async fn on_failure(&self, failure: &RequestFailure<'_>);
}

/// Leaves failures to the caller.
pub struct PassThrough;

#[async_trait]
impl ResponsePolicy for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    async fn on_failure(&self, _failure: &RequestFailure<'_>) {}
}

/// Treats a 401 from any non-exempt URL as an expired session: the stored
/// session is cleared, the in-memory session state is reset and the host is
/// sent to the login page with a full navigation.
pub struct SessionGuard {
    session: SessionStore,
    state: Option<SharedSessionState>,
    navigator: Arc<dyn Navigator>,
    exempt_paths: Vec<String>,
    login_route: String,
}

impl SessionGuard {
    pub fn new(
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        exempt_paths: Vec<String>,
        login_route: impl Into<String>,
    ) -> Self {
        SessionGuard {
            session,
            state: None,
            navigator,
            exempt_paths,
            login_route: login_route.into(),
        }
    }

    /// Reset this session state on a forced logout.
    pub fn with_session_state(mut self, state: SharedSessionState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_exempt(&self, url: &str) -> bool {
        self.exempt_paths.iter().any(|p| url.contains(p.as_str()))
    }
}

#[async_trait]
impl ResponsePolicy for SessionGuard {
    fn name(&self) -> &str {
        "session-guard"
    }

    async fn on_failure(&self, failure: &RequestFailure<'_>) {
        if failure.status != Some(StatusCode::UNAUTHORIZED)
            || failure.exempt
            || self.is_exempt(failure.url)
        {
            return;
        }

        info!("Authentication expired, redirecting to login...");
        if let Err(e) = self.session.clear().await {
            error!("Failed to clear the stored session after a 401: {}", e);
        }
        if let Some(state) = &self.state {
            state.send_replace(SessionState::default());
        }
        self.navigator
            .navigate(Navigation::Location(self.login_route.clone()));
    }
}
