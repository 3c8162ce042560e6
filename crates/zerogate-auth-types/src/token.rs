//! Signed session tokens (HS256 JWT) carried in the session cookie.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: u64,
}

/// Errors returned by [`issue_session_token`] and [`validate_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims payload.
///
/// | Field  | JWT claim | Meaning |
/// |--------|-----------|---------|
/// | `sub`  | `sub`     | user ID (UUID string) |
/// | `name` | custom    | username, shown on logout |
/// | `exp`  | `exp`     | expiry, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub exp: u64,
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sign a session token for `user_id` valid for `ttl_secs`.
///
/// Returns the token and its expiry timestamp.
pub fn issue_session_token(
    user_id: Uuid,
    username: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<(String, u64), TokenError> {
    let exp = now_secs() + ttl_secs;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        name: username.to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;
    Ok((token, exp))
}

/// Validate a session cookie value, returning the parsed identity.
///
/// Validation: HS256, `exp` checked with the library's default 60s leeway,
/// required claims `exp` + `sub`.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionInfo, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        username: data.claims.name,
        expires_at: data.claims.exp,
    })
}
