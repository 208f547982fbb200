pub mod controller;
pub mod error;
pub mod forms;
pub mod redirect;

// Re-export so we can do "use crate::auth::*;"
pub use controller::{session_state_channel, AuthController, SessionState, SharedSessionState, Status};
pub use error::AuthError;
pub use forms::{LoginRequest, SignupForm, SignupRequest};
pub use redirect::{fragment_token, RedirectOutcome};
