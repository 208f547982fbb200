//! The persisted session record and the credential it carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::UserProfile;
use crate::utils::token::mask_token;

/// Stored in place of a token when the identity provider left the session in
/// an HTTP-only cookie that the client cannot read.
pub const COOKIE_SESSION_SENTINEL: &str = "oauth2-cookie";

const BEARER_PREFIX: &str = "Bearer ";

/// Keys the record writes itself; a profile must not carry them in `extra`.
const RECORD_KEYS: [&str; 2] = ["token", "isAdmin"];

/// What the client presents to the backend: either a bearer token or the
/// marker for a cookie-backed external session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Credential {
    Token(String),
    CookieSession,
}

impl Credential {
    /// The raw stored value.
    pub fn as_str(&self) -> &str {
        match self {
            Credential::Token(token) => token,
            Credential::CookieSession => COOKIE_SESSION_SENTINEL,
        }
    }

    pub fn is_cookie_session(&self) -> bool {
        matches!(self, Credential::CookieSession)
    }

    /// Value for the `Authorization` header. Tokens that already carry the
    /// bearer scheme are used verbatim.
    pub fn authorization_value(&self) -> String {
        let raw = self.as_str();
        if raw.starts_with(BEARER_PREFIX) {
            raw.to_string()
        } else {
            format!("{}{}", BEARER_PREFIX, raw)
        }
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        if value == COOKIE_SESSION_SENTINEL {
            Credential::CookieSession
        } else {
            Credential::Token(value)
        }
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Credential::from(value.to_string())
    }
}

impl From<Credential> for String {
    fn from(credential: Credential) -> Self {
        match credential {
            Credential::Token(token) => token,
            Credential::CookieSession => COOKIE_SESSION_SENTINEL.to_string(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(token) => f.debug_tuple("Token").field(&mask_token(token)).finish(),
            Credential::CookieSession => f.write_str("CookieSession"),
        }
    }
}

/// The single persisted authentication artifact.
///
/// Serialized flat, so that a sign-in response (`{"token": ..., "username": ...}`)
/// can be stored as received. `isAdmin` is derived from the profile roles
/// whenever an identity is attached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRecord {
    #[serde(rename = "token")]
    credential: Credential,
    #[serde(flatten)]
    identity: Option<UserProfile>,
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

impl SessionRecord {
    /// A record holding only a credential, before any profile is known.
    pub fn new(credential: impl Into<Credential>) -> Self {
        SessionRecord {
            credential: credential.into(),
            identity: None,
            is_admin: false,
        }
    }

    /// Attach a profile and recompute the admin flag from its roles. The
    /// record's own credential wins over any `token` the profile echoes.
    pub fn with_identity(mut self, mut profile: UserProfile) -> Self {
        for key in RECORD_KEYS {
            profile.extra.remove(key);
        }
        self.is_admin = profile.is_admin();
        self.identity = Some(profile);
        self
    }

    /// Build a record from a sign-in response body. Returns `None` when the
    /// response carries no `token`, in which case nothing is persisted.
    pub fn from_sign_in(body: Value) -> Option<Self> {
        if !body.get("token").map(Value::is_string).unwrap_or(false) {
            return None;
        }
        let record: SessionRecord = serde_json::from_value(body).ok()?;
        Some(record.normalized())
    }

    /// Re-derive the admin flag from the attached identity.
    pub fn normalized(mut self) -> Self {
        self.is_admin = self
            .identity
            .as_ref()
            .map(UserProfile::is_admin)
            .unwrap_or(false);
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn identity(&self) -> Option<&UserProfile> {
        self.identity.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|p| p.username.as_str())
    }
}
