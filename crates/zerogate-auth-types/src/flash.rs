//! One-shot user-visible messages carried across a redirect in a cookie.

use std::fmt;

use axum_extra::extract::cookie::CookieJar;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::cookie::{CookieOptions, FLASH_COOKIE, clear_cookie, set_flash_cookie};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }

    /// Cookie-safe encoding (URL-safe base64 of the JSON form).
    pub fn encode(&self) -> String {
        // Serializing a two-field struct of plain strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Attach a flash message to the outgoing response.
pub fn set_flash(jar: CookieJar, flash: &Flash, opts: &CookieOptions) -> CookieJar {
    set_flash_cookie(jar, flash.encode(), opts)
}

/// Read the pending flash message (if any) and expire its cookie.
pub fn take_flash(jar: CookieJar, opts: &CookieOptions) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::decode(cookie.value());
    (clear_cookie(jar, FLASH_COOKIE, opts), flash)
}
