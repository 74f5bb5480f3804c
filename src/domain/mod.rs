//! Domain types and the ports through which the loaders reach the payment SDK
//! and the host's configuration.

pub mod config;
pub mod context;
pub mod credential;
pub mod ports;
