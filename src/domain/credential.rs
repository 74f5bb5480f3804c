use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An API key handed to the payment SDK.
///
/// `Debug` and `Display` both print `[REDACTED]` so configuration dumps and log
/// lines never carry the key. The buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read-only access to the key, for handing it to the SDK.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// An empty key is treated the same as no key at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` for secret (server-side) keys.
    pub fn is_secret(&self) -> bool {
        self.0.starts_with("sk_") || self.0.starts_with("rk_")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
