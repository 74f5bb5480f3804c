use crate::domain::context::RequestContext;
use crate::domain::ports::{RuntimeConfigRef, ServerSdkFactory};
use crate::error::{LoaderError, Result};
use tracing::{debug, warn};

/// Hands out one server SDK handle per request.
///
/// The handle is stored in the request's own [`RequestContext`], never in the
/// cache itself, so a handle built with one request's credentials cannot reach
/// another request.
pub struct ServerStripeCache<F: ServerSdkFactory> {
    factory: F,
    config: RuntimeConfigRef,
}

impl<F: ServerSdkFactory> ServerStripeCache<F> {
    /// Creates a new `ServerStripeCache`.
    ///
    /// # Arguments
    ///
    /// * `factory` - Constructor of the server SDK.
    /// * `config` - Provider of the per-request server configuration.
    pub fn new(factory: F, config: RuntimeConfigRef) -> Self {
        Self { factory, config }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the request's handle, constructing it on first use.
    ///
    /// A missing secret key is only reported; the SDK decides whether it can be
    /// constructed without one. Construction errors are returned to the caller.
    pub fn get_or_create(&self, ctx: &RequestContext<F::Handle>) -> Result<F::Handle> {
        if let Some(handle) = ctx.stripe() {
            return Ok(handle.clone());
        }

        let request_id = ctx.info().id;
        let config = self.config.server(ctx.info());
        let key = config.key.filter(|key| !key.is_empty());
        if key.is_none() {
            warn!(%request_id, "{}", LoaderError::MissingCredential("secret"));
        }

        let handle = self
            .factory
            .construct(key.as_ref(), &config.options)
            .map_err(LoaderError::Construction)?;
        debug!(%request_id, "Stored Stripe server instance in request context");

        Ok(ctx.store_stripe(handle).clone())
    }
}
