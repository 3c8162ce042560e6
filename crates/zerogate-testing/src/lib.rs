//! Test utilities for Zerogate services.
//!
//! Provides `MockSession` for authenticated requests and `Set-Cookie` readers.
//! Import in `#[cfg(test)]` blocks and integration tests only.

pub mod auth;
pub mod cookies;
