pub mod runtime_config;
pub mod simulated;
