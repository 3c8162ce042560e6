//! Session-cookie identity extractor.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::SESSION_COOKIE;
use crate::token::{SessionInfo, validate_session_token};

/// Where unauthenticated requests to protected pages are sent.
pub const LOGIN_PATH: &str = "/login";

/// Application state that can verify session tokens.
pub trait SessionSecret {
    fn session_secret(&self) -> &str;
}

/// A fully authenticated user (password and second factor both passed).
///
/// Rejects with a redirect to [`LOGIN_PATH`] when the session cookie is absent,
/// expired or forged. Use `Option<SessionUser>` where anonymous access is fine.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
}

impl From<SessionInfo> for SessionUser {
    fn from(info: SessionInfo) -> Self {
        Self {
            user_id: info.user_id,
            username: info.username,
        }
    }
}

fn session_from_parts<S: SessionSecret>(parts: &Parts, state: &S) -> Option<SessionUser> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    match validate_session_token(cookie.value(), state.session_secret()) {
        Ok(info) => Some(info.into()),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session cookie");
            None
        }
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: SessionSecret + Send + Sync,
{
    type Rejection = Redirect;

    // Resolve synchronously and return a 'static future so the borrow of
    // `parts` does not leak into the returned future.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = session_from_parts(parts, state);
        async move { user.ok_or_else(|| Redirect::to(LOGIN_PATH)) }
    }
}

impl<S> OptionalFromRequestParts<S> for SessionUser
where
    S: SessionSecret + Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let user = session_from_parts(parts, state);
        async move { Ok(user) }
    }
}
