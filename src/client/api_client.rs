use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use reqwest::cookie::Jar;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use super::error::ClientError;
use super::policy::{PassThrough, RequestFailure, ResponsePolicy};
use crate::models::Credential;
use crate::store::SessionStore;

/// Which credential, if any, goes into the `Authorization` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CredentialSource {
    /// Whatever the session store holds at send time.
    #[default]
    Session,
    /// A credential known to the caller but not (yet) stored.
    Explicit(Credential),
    /// No bearer header; rely on ambient cookies.
    Omit,
}

/// Per-request knobs.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged on top of the default `content-type` and `authorization` headers.
    pub headers: HeaderMap,
    pub credential: CredentialSource,
    /// Skip the forced-logout policy for this request.
    pub exempt: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        let invalid = || ClientError::InvalidHeader {
            name: name.to_string(),
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = CredentialSource::Explicit(credential);
        self
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = CredentialSource::Omit;
        self
    }

    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }
}

/// A decoded response body: JSON when the server said so, text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// JSON as-is; text is parsed if it happens to be JSON, else wrapped as a string.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            ResponseBody::Json(value) => serde_json::from_value(value),
            ResponseBody::Text(text) => serde_json::from_str(&text),
        }
    }
}

/// The one HTTP client of the crate.
///
/// Every request is decorated with the bearer credential from the session
/// store, every failure is logged with method, URL, status and body and then
/// handed to the configured `ResponsePolicy` before being returned to the
/// caller unchanged.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    policy: Arc<dyn ResponsePolicy>,
    cookies: Arc<Jar>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: SessionStore,
        policy: Arc<dyn ResponsePolicy>,
        cookies: Arc<Jar>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()
            .map_err(ClientError::Build)?;

        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            policy,
            cookies,
        })
    }

    /// A client that never triggers side effects on failure.
    pub fn pass_through(
        base_url: impl Into<String>,
        session: SessionStore,
        cookies: Arc<Jar>,
    ) -> Result<Self, ClientError> {
        Self::new(base_url, session, Arc::new(PassThrough), cookies)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Absolute URLs are used as-is, anything else is joined to the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Seed the shared cookie jar, e.g. with a session cookie set during an
    /// external login in the browser.
    pub fn add_cookie(&self, cookie: &str) -> Result<(), ClientError> {
        let url = Url::parse(&self.base_url).map_err(|source| ClientError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        self.cookies.add_cookie_str(cookie, &url);
        Ok(())
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ResponseBody, ClientError> {
        self.send::<()>(Method::GET, path, None, options).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        self.send(Method::POST, path, Some(body), options).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        self.send(Method::PUT, path, Some(body), options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<ResponseBody, ClientError> {
        self.send::<()>(Method::DELETE, path, None, options).await
    }

    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ResponseBody, ClientError> {
        let url = self.url(path);
        let headers = self.decorate(&options).await?;

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(|source| ClientError::Decode {
                url: url.clone(),
                source,
            })?;
            request = request.body(encoded);
        }

        debug!("{} {}", method, url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                error!(
                    method = %method,
                    url = url.as_str(),
                    error = %source,
                    "API request failed without a response"
                );
                self.report_failure(&method, &url, None, options.exempt).await;
                return Err(ClientError::Transport { url, source });
            }
        };

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let text = match response.text().await {
            Ok(text) => text,
            Err(source) => {
                error!(
                    method = %method,
                    url = url.as_str(),
                    status = status.as_u16(),
                    error = %source,
                    "API response body could not be read"
                );
                self.report_failure(&method, &url, Some(status), options.exempt)
                    .await;
                return Err(ClientError::Transport { url, source });
            }
        };

        debug!("API response for {}: {}", url, status.as_u16());

        if !status.is_success() {
            error!(
                method = %method,
                url = url.as_str(),
                status = status.as_u16(),
                body = text.as_str(),
                "API error"
            );
            self.report_failure(&method, &url, Some(status), options.exempt)
                .await;
            return Err(ClientError::Status {
                method,
                url,
                status,
                body: text,
            });
        }

        if is_json && !text.trim().is_empty() {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .map_err(|source| ClientError::Decode { url, source })
        } else {
            Ok(ResponseBody::Text(text))
        }
    }

    async fn report_failure(
        &self,
        method: &Method,
        url: &str,
        status: Option<http::StatusCode>,
        exempt: bool,
    ) {
        self.policy
            .on_failure(&RequestFailure {
                method,
                url,
                status,
                exempt,
            })
            .await;
    }

    /// Default headers, then the bearer credential, then caller overrides.
    async fn decorate(&self, options: &RequestOptions) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let credential = match &options.credential {
            CredentialSource::Session => self
                .session
                .read()
                .await
                .map(|record| record.credential().clone()),
            CredentialSource::Explicit(credential) => Some(credential.clone()),
            CredentialSource::Omit => None,
        };
        if let Some(credential) = credential {
            let value = HeaderValue::from_str(&credential.authorization_value()).map_err(|_| {
                ClientError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        Ok(headers)
    }
}
