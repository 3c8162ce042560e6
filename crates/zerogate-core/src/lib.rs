//! Shared service plumbing: configuration loading, tracing, health checks and middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
