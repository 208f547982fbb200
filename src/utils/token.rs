//! Diagnostics for bearer tokens. Nothing here verifies a signature; it only
//! peeks at JWT claims so they can be shown to the user or logged.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

const VISIBLE_PREFIX: usize = 20;

/// Shorten a token for logs: the first 20 characters followed by `...`.
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(VISIBLE_PREFIX) {
        Some((idx, _)) => format!("{}...", &token[..idx]),
        None => "***".to_string(),
    }
}

/// What could be read from a JWT payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSummary {
    pub subject: Option<String>,
    pub roles: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSummary {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct Claims {
    sub: Option<String>,
    roles: Option<Vec<String>>,
    authorities: Option<Value>,
    exp: Option<i64>,
}

/// Decode the payload segment of a JWT. Returns `None` for anything that is
/// not a three-part token with a JSON payload.
pub fn inspect_token(token: &str) -> Option<TokenSummary> {
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;

    let roles = match (claims.roles, claims.authorities) {
        (Some(roles), _) => roles,
        (None, Some(authorities)) => authority_names(&authorities),
        (None, None) => Vec::new(),
    };

    Some(TokenSummary {
        subject: claims.sub,
        roles,
        expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
    })
}

/// Spring tokens list authorities either as strings or as `{"authority": ...}`.
fn authority_names(authorities: &Value) -> Vec<String> {
    authorities
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map
                        .get("authority")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn sign(claims: &Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_inspect_roles_claim() {
        let exp = Utc::now().timestamp() + 3600;
        let token = sign(&json!({"sub": "jane", "roles": ["ROLE_ADMIN"], "exp": exp}));

        let summary = inspect_token(&token).unwrap();
        assert_eq!(summary.subject.as_deref(), Some("jane"));
        assert_eq!(summary.roles, vec!["ROLE_ADMIN".to_string()]);
        assert_eq!(summary.expires_at.unwrap().timestamp(), exp);
        assert!(!summary.is_expired());
    }

    /// Test that Spring-style authority objects are flattened to names.
    #[test]
    fn test_inspect_authorities_claim() {
        let token = sign(&json!({
            "sub": "sam",
            "authorities": [{"authority": "ROLE_USER"}, "ROLE_EXTRA"],
            "exp": 1
        }));
        let summary = inspect_token(&format!("Bearer {}", token)).unwrap();
        assert_eq!(summary.roles, vec!["ROLE_USER", "ROLE_EXTRA"]);
        assert!(summary.is_expired());
    }

    #[test]
    fn test_inspect_rejects_opaque_tokens() {
        assert!(inspect_token("oauth2-cookie").is_none());
        assert!(inspect_token("a.b").is_none());
        assert!(inspect_token("a.!!!.c").is_none());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(
            mask_token("abcdefghijklmnopqrstuvwxyz"),
            "abcdefghijklmnopqrst..."
        );
    }
}
