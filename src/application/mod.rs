//! Application layer: the two ways of obtaining a payment SDK handle.
//!
//! `ClientStripeLoader` shares one lazily loaded handle across every consumer in
//! the process and deduplicates concurrent loads. `ServerStripeCache` builds one
//! handle per inbound request and keeps it in that request's context.

pub mod client;
pub mod server;
