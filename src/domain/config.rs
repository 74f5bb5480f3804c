use super::credential::Credential;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Construction options for the client-side SDK.
///
/// Only the commonly used fields are typed; anything else the SDK accepts is kept
/// in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    pub stripe_account: Option<String>,
    pub api_version: Option<String>,
    pub locale: Option<String>,
    pub betas: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Construction options for the server-side SDK.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerOptions {
    pub api_version: Option<String>,
    pub max_network_retries: Option<u32>,
    /// Request timeout in milliseconds.
    pub timeout: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub telemetry: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Public (client-side) configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Publishable key.
    pub key: Option<Credential>,
    pub options: Option<ClientOptions>,
    /// Disables automatic loading and handle caching.
    pub manual_client_load: bool,
    /// Upper bound for a load episode. Unset means wait indefinitely.
    pub load_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

/// Private (server-side) configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Secret key.
    pub key: Option<Credential>,
    pub options: ServerOptions,
}

/// The full options document, one section per side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    pub client: ClientConfig,
    pub server: ServerConfig,
}
