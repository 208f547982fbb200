use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::SessionConfig;
use crate::client::DEFAULT_EXEMPT_PATHS;

/// The only configuration version understood so far.
pub const CONFIG_VERSION: &str = "1.0.0";

/// Prefix for environment overrides, e.g. `WELLSTRIDE_API__BASE_URL`.
pub const ENV_PREFIX: &str = "WELLSTRIDE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0. Every section has defaults, so an empty file
/// (or no file at all) yields a client for a backend on localhost:8080.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with `WELLSTRIDE_*` environment overrides.
/// A missing file is not an error.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::from(Serialized::default("version", CONFIG_VERSION))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

/// Parse a config from a YAML string (no environment overrides).
pub fn config_from_yaml(yaml: &str) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::from(Serialized::default("version", CONFIG_VERSION))
        .merge(Yaml::string(yaml));
    extract(figment)
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// The JSON schema for the configuration, pretty-printed.
pub fn schema_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(Config))
}

/// Where the backend lives.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Session lifecycle settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    /// URL fragments where a 401 never forces a logout.
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_dashboard_route")]
    pub dashboard_route: String,
    /// Registration id of the external identity provider.
    #[serde(default = "default_oauth_provider")]
    pub oauth_provider: String,
    /// How long a failed external login shows its error before going back to login.
    #[serde(default = "default_redirect_failure_delay_ms")]
    pub redirect_failure_delay_ms: u64,
}

impl AuthConfig {
    pub fn redirect_failure_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_failure_delay_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            exempt_paths: default_exempt_paths(),
            login_route: default_login_route(),
            dashboard_route: default_dashboard_route(),
            oauth_provider: default_oauth_provider(),
            redirect_failure_delay_ms: default_redirect_failure_delay_ms(),
        }
    }
}

fn default_exempt_paths() -> Vec<String> {
    DEFAULT_EXEMPT_PATHS.iter().map(|p| p.to_string()).collect()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_dashboard_route() -> String {
    "/dashboard".to_string()
}

fn default_oauth_provider() -> String {
    "google".to_string()
}

fn default_redirect_failure_delay_ms() -> u64 {
    2000
}

/// Settings for the goal and workout services.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct FeaturesConfig {
    /// Apply the forced-logout-on-401 policy to feature requests too.
    /// Off by default: feature pages report a 401 like any other failure.
    #[serde(default)]
    pub force_logout_on_unauthorized: bool,
}
