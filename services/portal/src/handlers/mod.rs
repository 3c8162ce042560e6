pub mod auth;
pub mod booking;
pub mod otp;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use zerogate_auth_types::cookie::{CookieOptions, PENDING_COOKIE, clear_cookie};
use zerogate_auth_types::flash::{Flash, set_flash};
use zerogate_auth_types::identity::LOGIN_PATH;

use crate::error::PortalError;

/// Redirect after a state change, carrying a one-shot message.
pub(crate) fn redirect_with_flash(
    jar: CookieJar,
    opts: &CookieOptions,
    to: &str,
    flash: Flash,
) -> Response {
    (set_flash(jar, &flash, opts), Redirect::to(to)).into_response()
}

pub(crate) fn pending_id(jar: &CookieJar) -> Option<String> {
    jar.get(PENDING_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

/// Send the browser back to the password step, forgetting its pending login.
pub(crate) fn restart_login(jar: CookieJar, opts: &CookieOptions, err: &PortalError) -> Response {
    let jar = clear_cookie(jar, PENDING_COOKIE, opts);
    redirect_with_flash(jar, opts, LOGIN_PATH, Flash::error(err.to_string()))
}
