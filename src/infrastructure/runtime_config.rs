use crate::domain::config::{ClientConfig, ModuleOptions, ServerConfig};
use crate::domain::context::RequestInfo;
use crate::domain::ports::RuntimeConfigProvider;

/// Configuration fixed at startup, identical for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticRuntimeConfig {
    options: ModuleOptions,
}

impl StaticRuntimeConfig {
    pub fn new(options: ModuleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }
}

impl RuntimeConfigProvider for StaticRuntimeConfig {
    fn client(&self) -> ClientConfig {
        self.options.client.clone()
    }

    fn server(&self, _request: &RequestInfo) -> ServerConfig {
        self.options.server.clone()
    }
}
