use super::config::{ClientConfig, ClientOptions, ServerConfig, ServerOptions};
use super::context::RequestInfo;
use super::credential::Credential;
use crate::error::BoxError;
use async_trait::async_trait;
use std::sync::Arc;

/// Asynchronous factory of the client-side SDK.
#[async_trait]
pub trait ClientSdkLoader: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    /// Loads the SDK. `Ok(None)` means the SDK reported no handle.
    async fn load(
        &self,
        key: &Credential,
        options: Option<&ClientOptions>,
    ) -> Result<Option<Self::Handle>, BoxError>;
}

/// Synchronous constructor of the server-side SDK.
pub trait ServerSdkFactory: Send + Sync {
    type Handle: Clone + Send + Sync + 'static;

    fn construct(
        &self,
        key: Option<&Credential>,
        options: &ServerOptions,
    ) -> Result<Self::Handle, BoxError>;
}

/// Source of read-only configuration snapshots.
pub trait RuntimeConfigProvider: Send + Sync {
    fn client(&self) -> ClientConfig;
    fn server(&self, request: &RequestInfo) -> ServerConfig;
}

pub type RuntimeConfigRef = Arc<dyn RuntimeConfigProvider>;

#[async_trait]
impl<T: ClientSdkLoader + ?Sized> ClientSdkLoader for Arc<T> {
    type Handle = T::Handle;

    async fn load(
        &self,
        key: &Credential,
        options: Option<&ClientOptions>,
    ) -> Result<Option<Self::Handle>, BoxError> {
        (**self).load(key, options).await
    }
}

impl<T: ServerSdkFactory + ?Sized> ServerSdkFactory for Arc<T> {
    type Handle = T::Handle;

    fn construct(
        &self,
        key: Option<&Credential>,
        options: &ServerOptions,
    ) -> Result<Self::Handle, BoxError> {
        (**self).construct(key, options)
    }
}
