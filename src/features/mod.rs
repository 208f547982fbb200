//! Goal and workout pages: thin services over the REST resources, using the
//! direct client.

pub mod error;
pub mod goals;
pub mod workouts;

pub use error::FeatureError;
pub use goals::GoalsService;
pub use workouts::WorkoutsService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{ApiClient, ClientError, ResponseBody};

/// List endpoints answer either with a bare array or with `{"data": [...]}`.
/// Anything else is read as an empty list.
pub(crate) fn list_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub(crate) fn decode_list<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
    body: ResponseBody,
) -> Result<Vec<T>, ClientError> {
    serde_json::from_value(Value::Array(list_items(body.into_value()))).map_err(|source| {
        ClientError::Decode {
            url: api.url(path),
            source,
        }
    })
}

pub(crate) fn decode_one<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
    body: ResponseBody,
) -> Result<T, ClientError> {
    body.decode().map_err(|source| ClientError::Decode {
        url: api.url(path),
        source,
    })
}
