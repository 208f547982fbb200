use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role name that grants administrator rights in the dashboard.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// The profile returned by `GET /api/auth/user` and embedded in sign-in responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Any further fields the server sends along; kept so a stored record
    /// reads back exactly as it was received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Construct a profile with the given username and roles.
    pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
        UserProfile {
            username: username.into(),
            roles,
            ..Default::default()
        }
    }

    /// Read a profile from a response body. Some identity providers leave the
    /// username out, so a missing one is taken as empty.
    pub fn from_response(body: Value) -> Option<Self> {
        let mut object = match body {
            Value::Object(object) => object,
            _ => return None,
        };
        object
            .entry("username")
            .or_insert_with(|| Value::String(String::new()));
        serde_json::from_value(Value::Object(object)).ok()
    }

    /// True when the role list carries the administrator role.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ADMIN_ROLE)
    }
}
