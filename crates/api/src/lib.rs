//! HTTP API: users resource, configuration and service wiring.

pub mod app;
pub mod config;
pub mod middleware;
