use crate::domain::config::{ClientOptions, ServerOptions};
use crate::domain::credential::Credential;
use crate::domain::ports::{ClientSdkLoader, ServerSdkFactory};
use crate::error::BoxError;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Version reported by the simulated SDK.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// API version used when the options do not pin one.
pub const DEFAULT_API_VERSION: &str = "2024-06-20";

/// Client-side SDK instance produced by [`SimulatedClientLoader`].
#[derive(Debug)]
pub struct ClientHandle {
    pub instance: u64,
    pub options: ClientOptions,
}

/// Server-side SDK instance produced by [`SimulatedServerFactory`].
#[derive(Debug)]
pub struct ServerHandle {
    pub instance: u64,
    pub api_version: String,
    pub max_network_retries: u32,
}

impl ServerHandle {
    pub fn version(&self) -> &'static str {
        SDK_VERSION
    }
}

/// In-process stand-in for the asynchronous client SDK loader.
///
/// Useful for local runs and tests: latency and failures are configurable and
/// every invocation is counted.
#[derive(Debug, Default)]
pub struct SimulatedClientLoader {
    latency: Duration,
    failure: Option<String>,
    invocations: AtomicUsize,
    instances: AtomicU64,
}

impl SimulatedClientLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every load reject with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of times the loader was called.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientSdkLoader for SimulatedClientLoader {
    type Handle = Arc<ClientHandle>;

    async fn load(
        &self,
        key: &Credential,
        options: Option<&ClientOptions>,
    ) -> Result<Option<Self::Handle>, BoxError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }
        if key.is_secret() {
            return Err("You should not use your secret key with the client SDK".into());
        }

        Ok(Some(Arc::new(ClientHandle {
            instance: self.instances.fetch_add(1, Ordering::SeqCst),
            options: options.cloned().unwrap_or_default(),
        })))
    }
}

/// In-process stand-in for the synchronous server SDK constructor.
#[derive(Debug, Default)]
pub struct SimulatedServerFactory {
    constructed: AtomicUsize,
}

impl SimulatedServerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles constructed so far.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }
}

impl ServerSdkFactory for SimulatedServerFactory {
    type Handle = Arc<ServerHandle>;

    fn construct(
        &self,
        key: Option<&Credential>,
        options: &ServerOptions,
    ) -> Result<Self::Handle, BoxError> {
        if key.is_none() {
            return Err("Neither apiKey nor config.authenticator provided".into());
        }

        let instance = self.constructed.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(Arc::new(ServerHandle {
            instance,
            api_version: options
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            max_network_retries: options.max_network_retries.unwrap_or(1),
        }))
    }
}
