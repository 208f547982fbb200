//! Reading the landing URL of an external login.

use crate::models::SessionRecord;

/// How a redirect completion ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectOutcome {
    /// A session already existed; nothing was fetched.
    AlreadyAuthenticated,
    Authenticated(SessionRecord),
}

/// The `token` parameter of the URL fragment, if any.
///
/// The fragment is parsed as `application/x-www-form-urlencoded`, so values
/// are percent-decoded and only an exact `token` key matches.
pub fn fragment_token(landing: &str) -> Option<String> {
    let (_, fragment) = landing.split_once('#')?;
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_among_other_parameters() {
        assert_eq!(
            fragment_token("http://localhost:5173/oauth2/redirect#state=xyz&token=abc123&expires=3600"),
            Some("abc123".to_string())
        );
        assert_eq!(fragment_token("/oauth2/redirect#token=abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(fragment_token("/oauth2/redirect"), None);
        assert_eq!(fragment_token("/oauth2/redirect#"), None);
        assert_eq!(fragment_token("/oauth2/redirect#token="), None);
        assert_eq!(fragment_token("/oauth2/redirect#access_token=abc"), None);
    }

    /// Test that a token in the query string is ignored.
    #[test]
    fn test_query_is_not_fragment() {
        assert_eq!(fragment_token("/oauth2/redirect?token=abc"), None);
    }

    #[test]
    fn test_percent_encoded_token() {
        assert_eq!(
            fragment_token("/oauth2/redirect#token=a%2Bb%3D"),
            Some("a+b=".to_string())
        );
    }
}
