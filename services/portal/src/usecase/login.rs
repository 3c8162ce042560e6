use rand::RngExt;

use crate::domain::repository::{PendingLoginStore, UserRepository};
use crate::domain::types::{PENDING_ID_LEN, PendingLogin, User};
use crate::error::PortalError;
use crate::infra::password::{verify_against_dummy, verify_password};

/// Alphanumeric charset for pending-login identifiers.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_pending_id() -> String {
    let mut rng = rand::rng();
    (0..PENDING_ID_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Ways a login identifier can name an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityLookup {
    Email,
    Username,
}

impl IdentityLookup {
    /// Lookup order; the first strategy that finds an account wins.
    pub const ORDER: [Self; 2] = [Self::Email, Self::Username];

    async fn find<U: UserRepository>(
        self,
        users: &U,
        identifier: &str,
    ) -> Result<Option<User>, PortalError> {
        match self {
            Self::Email => users.find_by_email(identifier).await,
            Self::Username => users.find_by_username(identifier).await,
        }
    }
}

pub async fn resolve_identity<U: UserRepository>(
    users: &U,
    identifier: &str,
) -> Result<Option<User>, PortalError> {
    for lookup in IdentityLookup::ORDER {
        if let Some(user) = lookup.find(users, identifier).await? {
            return Ok(Some(user));
        }
    }
    Ok(None)
}

// ── Login (first factor) ──────────────────────────────────────────────────────

pub struct LoginInput {
    /// Email address or username.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub pending_id: String,
    pub user: User,
}

pub struct LoginUseCase<U: UserRepository, P: PendingLoginStore> {
    pub users: U,
    pub pending: P,
    pub pending_ttl_secs: u64,
}

impl<U: UserRepository, P: PendingLoginStore> LoginUseCase<U, P> {
    /// Verify the password and open a pending login. Never issues a session.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, PortalError> {
        let identifier = input.identifier.trim();
        let user = if identifier.is_empty() {
            None
        } else {
            resolve_identity(&self.users, identifier).await?
        };

        let verified = match &user {
            Some(user) => verify_password(&input.password, &user.password_hash),
            None => verify_against_dummy(&input.password),
        };
        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::info!("login rejected");
                return Err(PortalError::InvalidCredentials);
            }
        };

        let pending_id = generate_pending_id();
        let pending = PendingLogin::new(user.id, self.pending_ttl_secs);
        self.pending
            .put(&pending_id, &pending, self.pending_ttl_secs)
            .await?;

        tracing::info!(user_id = %user.id, "password accepted, awaiting OTP");
        Ok(LoginOutput { pending_id, user })
    }
}
