use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The server refused the request; carries the message shown to the user.
    #[error("{0}")]
    Rejected(String),
    /// A form check failed before anything was sent.
    #[error("{0}")]
    Validation(String),
    #[error("could not persist session: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
