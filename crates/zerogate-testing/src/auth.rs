//! Mock session helpers for integration tests.
//!
//! Protected pages read identity from the signed session cookie. `MockSession`
//! signs one with the service's test secret so no login round-trip is needed.

use http::{HeaderValue, header};
use uuid::Uuid;

use zerogate_auth_types::cookie::SESSION_COOKIE;
use zerogate_auth_types::token::issue_session_token;

/// Identity to sign into a session cookie.
pub struct MockSession {
    pub user_id: Uuid,
    pub username: String,
}

impl MockSession {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// `Cookie` header value carrying a valid session for one hour.
    pub fn cookie(&self, secret: &str) -> String {
        let (token, _) = issue_session_token(self.user_id, &self.username, secret, 3600)
            .expect("failed to sign test session");
        format!("{SESSION_COOKIE}={token}")
    }

    pub fn header(&self, secret: &str) -> (header::HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&self.cookie(secret)).expect("cookie is ASCII");
        (header::COOKIE, value)
    }
}
