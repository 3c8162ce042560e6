//! Cookie builders for the session, pending-login and flash cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the signed session token (fully authenticated).
pub const SESSION_COOKIE: &str = "zerogate_session";

/// Cookie name for the opaque pending-login id (password ok, OTP outstanding).
pub const PENDING_COOKIE: &str = "zerogate_pending";

/// Cookie name for one-shot flash messages.
pub const FLASH_COOKIE: &str = "zerogate_flash";

/// Attributes shared by every cookie the portal sets.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    /// `Domain` attribute; host-only cookie when `None`.
    pub domain: Option<String>,
    /// `Secure` attribute.
    pub secure: bool,
}

fn build(name: &'static str, value: String, max_age: Duration, opts: &CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(opts.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &opts.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use zerogate_auth_types::cookie::{set_session_cookie, CookieOptions, SESSION_COOKIE};
///
/// let opts = CookieOptions { domain: Some("example.com".to_string()), secure: true };
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), 3600, &opts);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    opts: &CookieOptions,
) -> CookieJar {
    jar.add(build(
        SESSION_COOKIE,
        value,
        Duration::seconds(max_age_secs as i64),
        opts,
    ))
}

/// Set the pending-login cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use zerogate_auth_types::cookie::{set_pending_cookie, CookieOptions, PENDING_COOKIE};
///
/// let jar = set_pending_cookie(CookieJar::new(), "abc".to_string(), 300, &CookieOptions::default());
/// let cookie = jar.get(PENDING_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "abc");
/// assert_eq!(cookie.domain(), None);
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(300)));
/// ```
pub fn set_pending_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: u64,
    opts: &CookieOptions,
) -> CookieJar {
    jar.add(build(
        PENDING_COOKIE,
        value,
        Duration::seconds(max_age_secs as i64),
        opts,
    ))
}

/// Set a flash cookie holding an already-encoded message.
pub fn set_flash_cookie(jar: CookieJar, value: String, opts: &CookieOptions) -> CookieJar {
    jar.add(build(FLASH_COOKIE, value, Duration::seconds(60), opts))
}

/// Expire a single cookie by setting Max-Age to 0.
pub fn clear_cookie(jar: CookieJar, name: &'static str, opts: &CookieOptions) -> CookieJar {
    jar.add(build(name, String::new(), Duration::ZERO, opts))
}

/// Clear both the session and pending cookies.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use zerogate_auth_types::cookie::{
///     clear_auth_cookies, set_pending_cookie, set_session_cookie, CookieOptions,
///     PENDING_COOKIE, SESSION_COOKIE,
/// };
///
/// let opts = CookieOptions::default();
/// let jar = set_session_cookie(CookieJar::new(), "s".to_string(), 60, &opts);
/// let jar = set_pending_cookie(jar, "p".to_string(), 60, &opts);
/// let jar = clear_auth_cookies(jar, &opts);
/// assert_eq!(jar.get(SESSION_COOKIE).unwrap().max_age(), Some(time::Duration::ZERO));
/// assert_eq!(jar.get(PENDING_COOKIE).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_auth_cookies(jar: CookieJar, opts: &CookieOptions) -> CookieJar {
    let jar = clear_cookie(jar, SESSION_COOKIE, opts);
    clear_cookie(jar, PENDING_COOKIE, opts)
}
