//! HTTP access to the WellStride backend.
//!
//! There is a single client type, [`ApiClient`]. What differs between the
//! auth-facing client and the one used by feature pages is only the
//! [`ResponsePolicy`] plugged into it.

mod api_client;
mod error;
pub mod policy;

pub use api_client::{ApiClient, CredentialSource, RequestOptions, ResponseBody};
pub use error::ClientError;
pub use policy::{PassThrough, RequestFailure, ResponsePolicy, SessionGuard, DEFAULT_EXEMPT_PATHS};
