use serde::Deserialize;
use thiserror::Error;

use zerogate_auth_types::cookie::CookieOptions;
use zerogate_core::config::Config;

/// Portal configuration loaded once from environment variables at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (pending-login markers).
    pub redis_url: String,
    /// HMAC secret for signing session tokens.
    pub session_secret: String,
    /// TCP port to listen on (default 8000). Env var: `PORTAL_PORT`.
    #[serde(default = "default_port")]
    pub portal_port: u16,
    /// Host names served; `*` allows any. Env var: `ALLOWED_HOSTS` (comma-separated).
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
    /// Cookie `Domain` attribute; host-only cookies when unset.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// Cookie `Secure` attribute (default true).
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Issuer shown in authenticator apps.
    #[serde(default = "default_totp_issuer")]
    pub totp_issuer: String,
    /// Accepted TOTP drift in 30s steps either side of now.
    #[serde(default = "default_totp_skew")]
    pub totp_skew: u8,
    /// Lifetime of the password-ok/OTP-outstanding marker.
    #[serde(default = "default_pending_ttl")]
    pub pending_login_ttl_secs: u64,
    /// Lifetime of a fully authenticated session.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["127.0.0.1".to_owned(), "localhost".to_owned()]
}

fn default_true() -> bool {
    true
}

fn default_totp_issuer() -> String {
    "FYP_WebApp".to_owned()
}

fn default_totp_skew() -> u8 {
    1
}

fn default_pending_ttl() -> u64 {
    300
}

fn default_session_ttl() -> u64 {
    // two weeks
    1_209_600
}

/// Upper bound for every lifetime setting: ten years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be between 1 and {MAX_TTL_SECS} seconds, got {value}")]
    TtlOutOfRange { name: &'static str, value: u64 },
}

impl Config for PortalConfig {}

impl PortalConfig {
    /// Range checks envy cannot express. Run once after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("PENDING_LOGIN_TTL_SECS", self.pending_login_ttl_secs),
            ("SESSION_TTL_SECS", self.session_ttl_secs),
        ] {
            if value == 0 || value > MAX_TTL_SECS {
                return Err(ConfigError::TtlOutOfRange { name, value });
            }
        }
        Ok(())
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            domain: self.cookie_domain.clone(),
            secure: self.cookie_secure,
        }
    }
}
