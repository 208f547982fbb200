use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::forms::{LoginRequest, SignupForm};
use super::redirect::{fragment_token, RedirectOutcome};
use crate::client::{ApiClient, RequestOptions};
use crate::config::AuthConfig;
use crate::models::{Credential, SessionRecord, UserProfile};
use crate::store::SessionStore;
use crate::ui::{Navigation, Navigator, Notifier};
use crate::utils::token::mask_token;

pub const SIGNIN_PATH: &str = "/api/auth/signin";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const PROFILE_PATH: &str = "/api/auth/user";

pub const LOGOUT_MESSAGE: &str = "Logged out successfully";
pub const REDIRECT_FAILURE_MESSAGE: &str = "Authentication failed. Please try again.";

/// Progress of the last auth request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The in-memory session, as observed by the rest of the application.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    /// Absent when unauthenticated, or when sign-in answered without a token.
    pub user: Option<SessionRecord>,
    pub is_authenticated: bool,
    pub status: Status,
    pub error: Option<String>,
}

impl SessionState {
    fn restored(record: Option<SessionRecord>) -> Self {
        SessionState {
            is_authenticated: record.is_some(),
            user: record,
            status: Status::Idle,
            error: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(SessionRecord::is_admin).unwrap_or(false)
    }
}

/// Sending half of the session state channel. Shared with the forced-logout
/// policy, which resets the state when it clears the store.
pub type SharedSessionState = Arc<watch::Sender<SessionState>>;

pub fn session_state_channel() -> SharedSessionState {
    let (state, _) = watch::channel(SessionState::default());
    Arc::new(state)
}

/// Owns the session lifecycle and keeps [`SessionState`] in step with the
/// persisted [`SessionStore`]. Apart from a forced logout, which only ever
/// resets it, no one else writes the state.
///
/// Readers get a `watch::Receiver` from [`AuthController::subscribe`].
pub struct AuthController {
    api: ApiClient,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
    state: SharedSessionState,
}

impl AuthController {
    /// A controller with an empty session. Call [`restore`](Self::restore)
    /// to pick up a persisted one, or use [`load`](Self::load).
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        AuthController {
            api,
            session,
            navigator,
            notifier,
            config,
            state: session_state_channel(),
        }
    }

    /// Publish state through `state` instead of a private channel.
    pub fn with_shared_state(mut self, state: SharedSessionState) -> Self {
        self.state = state;
        self
    }

    pub async fn load(
        api: ApiClient,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        let controller = Self::new(api, session, navigator, notifier, config);
        controller.restore().await;
        controller
    }

    /// Re-initialise the in-memory state from storage, as on application
    /// load or after a hard navigation.
    pub async fn restore(&self) -> SessionState {
        let record = self.session.read().await;
        debug!("Restored session, authenticated={}", record.is_some());
        let state = SessionState::restored(record);
        self.state.send_replace(state.clone());
        state
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Local sign-in. The response is persisted as the session record when
    /// it carries a token. Never navigates.
    pub async fn login(&self, request: &LoginRequest) -> Result<Option<SessionRecord>, AuthError> {
        self.start_request();

        let body = match self.api.post(SIGNIN_PATH, request, RequestOptions::new()).await {
            Ok(body) => body,
            Err(e) => {
                let message = e.user_message();
                warn!("Login failed for '{}': {}", request.username, message);
                self.state.send_replace(SessionState {
                    user: None,
                    is_authenticated: false,
                    status: Status::Failed,
                    error: Some(message.clone()),
                });
                return Err(AuthError::Rejected(message));
            }
        };

        let record = SessionRecord::from_sign_in(body.into_value());
        match &record {
            Some(record) => {
                if let Err(e) = self.session.write(record).await {
                    return Err(self.fail_request(e.into()));
                }
            }
            None => warn!("Sign-in response carried no token; session not persisted"),
        }

        info!("User '{}' logged in", request.username);
        self.state.send_replace(SessionState {
            user: record.clone(),
            is_authenticated: true,
            status: Status::Succeeded,
            error: None,
        });
        Ok(record)
    }

    /// Create an account. Registration never signs the user in.
    pub async fn register(&self, form: &SignupForm) -> Result<serde_json::Value, AuthError> {
        let request = form.validate()?;
        self.start_request();

        match self.api.post(SIGNUP_PATH, &request, RequestOptions::new()).await {
            Ok(body) => {
                info!("Registered user '{}'", request.username);
                self.state.send_modify(|state| {
                    state.status = Status::Succeeded;
                    state.error = None;
                });
                Ok(body.into_value())
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Registration failed for '{}': {}", request.username, message);
                Err(self.fail_request(AuthError::Rejected(message)))
            }
        }
    }

    /// Drop the session everywhere. Safe to call when already logged out.
    pub async fn logout(&self) {
        if let Err(e) = self.session.clear().await {
            error!("Failed to clear stored session: {}", e);
        }
        self.state.send_replace(SessionState::default());
        self.notifier.success(LOGOUT_MESSAGE);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| {
            state.error = None;
            state.status = Status::Idle;
        });
    }

    /// Where the identity provider flow starts.
    pub fn external_login_url(&self) -> String {
        format!(
            "{}/oauth2/authorization/{}",
            self.api.base_url(),
            self.config.oauth_provider
        )
    }

    pub fn begin_external_login(&self) {
        let url = self.external_login_url();
        info!("Starting external login via {}", self.config.oauth_provider);
        self.navigator.navigate(Navigation::Location(url));
    }

    /// Finish an external login from the URL the provider sent the user back to.
    ///
    /// A `token` in the fragment is used as the bearer credential; without
    /// one the profile is fetched on the strength of the session cookie and
    /// the record stores the cookie-session marker. The record is persisted
    /// only once the profile has been fetched. On failure the error is shown
    /// and, after the configured delay, the user is routed back to login.
    pub async fn complete_external_redirect(&self, landing: &str) -> Result<RedirectOutcome, AuthError> {
        if self.is_authenticated() {
            self.navigator
                .navigate(Navigation::Route(self.config.dashboard_route.clone()));
            return Ok(RedirectOutcome::AlreadyAuthenticated);
        }

        // The profile request belongs to the login flow, so a 401 here must
        // not trigger the forced logout.
        let (credential, options) = match fragment_token(landing) {
            Some(token) => {
                info!("Token from external login redirect: {}", mask_token(&token));
                let credential = Credential::from(token);
                let options = RequestOptions::new()
                    .with_credential(credential.clone())
                    .exempt();
                (credential, options)
            }
            None => {
                info!("No token in redirect, attempting cookie-based session");
                (
                    Credential::CookieSession,
                    RequestOptions::new().without_credential().exempt(),
                )
            }
        };

        let record = match self.fetch_profile(options).await {
            Ok(profile) => SessionRecord::new(credential).with_identity(profile),
            Err(e) => return Err(self.fail_redirect(e).await),
        };
        if let Err(e) = self.session.write(&record).await {
            return Err(self.fail_redirect(e.into()).await);
        }

        info!(
            "External login completed for '{}' (admin={})",
            record.username().unwrap_or_default(),
            record.is_admin()
        );
        self.state.send_modify(|state| {
            state.user = Some(record.clone());
            state.is_authenticated = true;
        });
        self.navigator
            .navigate(Navigation::Route(self.config.dashboard_route.clone()));
        Ok(RedirectOutcome::Authenticated(record))
    }

    async fn fetch_profile(&self, options: RequestOptions) -> Result<UserProfile, AuthError> {
        let body = self
            .api
            .get(PROFILE_PATH, options)
            .await
            .map_err(|e| AuthError::Rejected(e.user_message()))?;
        UserProfile::from_response(body.into_value())
            .ok_or_else(|| AuthError::Rejected("unexpected profile response".to_string()))
    }

    fn start_request(&self) {
        self.state.send_modify(|state| {
            state.status = Status::Loading;
            state.error = None;
        });
    }

    fn fail_request(&self, cause: AuthError) -> AuthError {
        let message = cause.user_message();
        self.state.send_modify(|state| {
            state.status = Status::Failed;
            state.error = Some(message);
        });
        cause
    }

    async fn fail_redirect(&self, cause: AuthError) -> AuthError {
        error!("External login redirect failed: {}", cause);
        self.state.send_modify(|state| {
            state.status = Status::Failed;
            state.error = Some(REDIRECT_FAILURE_MESSAGE.to_string());
        });
        self.notifier.error(REDIRECT_FAILURE_MESSAGE);

        tokio::time::sleep(self.config.redirect_failure_delay()).await;
        self.navigator
            .navigate(Navigation::Route(self.config.login_route.clone()));
        AuthError::Rejected(REDIRECT_FAILURE_MESSAGE.to_string())
    }
}
