//! Per-request scope carried through the server request pipeline.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only facts about an inbound request.
///
/// Configuration providers receive this to resolve per-request settings.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub id: RequestId,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl RequestInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: RequestId::generate(),
            path: path.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scope object owned by exactly one request.
///
/// Created when the request starts and dropped when it ends. The SDK slot is
/// write-once: after the first handle is stored it never changes.
pub struct RequestContext<H> {
    info: RequestInfo,
    stripe: OnceLock<H>,
}

impl<H> RequestContext<H> {
    pub fn new(info: RequestInfo) -> Self {
        Self {
            info,
            stripe: OnceLock::new(),
        }
    }

    pub fn info(&self) -> &RequestInfo {
        &self.info
    }

    /// The handle stored for this request, if any.
    pub fn stripe(&self) -> Option<&H> {
        self.stripe.get()
    }

    /// Stores `handle` unless the slot is already populated, and returns the slot's
    /// value. A handle that loses the race is dropped.
    pub(crate) fn store_stripe(&self, handle: H) -> &H {
        self.stripe.get_or_init(|| handle)
    }
}

impl<H> fmt::Debug for RequestContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("info", &self.info)
            .field("stripe", &self.stripe.get().map(|_| ".."))
            .finish()
    }
}
