use std::time::Duration;
use thiserror::Error;

/// Opaque error raised by the external payment SDK.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("No {0} key configured for Stripe")]
    MissingCredential(&'static str),
    #[error("Failed to load Stripe client: {0}")]
    ExternalLoad(#[source] BoxError),
    #[error("Failed to construct Stripe server instance: {0}")]
    Construction(#[source] BoxError),
    #[error("Stripe client load did not settle within {0:?}")]
    LoadTimeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
