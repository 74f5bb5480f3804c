use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stripe_loader::application::client::ClientStripeLoader;
use stripe_loader::domain::config::{ClientConfig, ClientOptions, ModuleOptions, ServerConfig};
use stripe_loader::domain::credential::Credential;
use stripe_loader::domain::ports::{ClientSdkLoader, RuntimeConfigRef};
use stripe_loader::error::BoxError;
use stripe_loader::infrastructure::runtime_config::StaticRuntimeConfig;
use tokio::sync::Notify;

/// SDK instance handed out by [`GatedLoader`].
#[derive(Debug)]
pub struct FakeSdk {
    pub key: String,
}

/// Client loader whose calls stay in flight until the test releases them.
#[derive(Default)]
pub struct GatedLoader {
    calls: AtomicUsize,
    gate: Notify,
    gated: bool,
    failure: Option<String>,
    empty: bool,
}

impl GatedLoader {
    /// Every load waits for one [`release`](Self::release).
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Default::default()
        }
    }

    /// Loads settle immediately.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Makes every load succeed without producing a handle.
    pub fn yielding_nothing(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ClientSdkLoader for GatedLoader {
    type Handle = Arc<FakeSdk>;

    async fn load(
        &self,
        key: &Credential,
        _options: Option<&ClientOptions>,
    ) -> Result<Option<Self::Handle>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated {
            self.gate.notified().await;
        }
        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }
        if self.empty {
            return Ok(None);
        }
        Ok(Some(Arc::new(FakeSdk {
            key: key.expose().to_string(),
        })))
    }
}

pub fn client_config(key: Option<&str>, manual: bool) -> RuntimeConfigRef {
    client_config_with(ClientConfig {
        key: key.map(Credential::from),
        manual_client_load: manual,
        ..Default::default()
    })
}

pub fn client_config_with(client: ClientConfig) -> RuntimeConfigRef {
    Arc::new(StaticRuntimeConfig::new(ModuleOptions {
        client,
        ..Default::default()
    }))
}

pub fn server_config(key: Option<&str>) -> RuntimeConfigRef {
    Arc::new(StaticRuntimeConfig::new(ModuleOptions {
        server: ServerConfig {
            key: key.map(Credential::from),
            ..Default::default()
        },
        ..Default::default()
    }))
}

/// Polls `condition` until it holds, failing the test after one second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

pub fn stripe_for(
    loader: &Arc<GatedLoader>,
    config: RuntimeConfigRef,
) -> ClientStripeLoader<Arc<GatedLoader>> {
    ClientStripeLoader::new(Arc::clone(loader), config)
}
