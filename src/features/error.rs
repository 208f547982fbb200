use thiserror::Error;

use crate::client::ClientError;

#[derive(Debug, Error)]
pub enum FeatureError {
    /// The form was rejected before anything was sent.
    #[error("{0}")]
    Validation(String),
    /// The request failed; `message` is what the page shows.
    #[error("{message}")]
    Api {
        message: &'static str,
        #[source]
        source: ClientError,
    },
}

impl FeatureError {
    /// The underlying client error, if the request got that far.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            FeatureError::Api { source, .. } => Some(source),
            FeatureError::Validation(_) => None,
        }
    }
}
