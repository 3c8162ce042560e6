use chrono::Utc;
use uuid::Uuid;

use crate::domain::email::is_valid_email;
use crate::domain::password::validate_password;
use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::PortalError;
use crate::infra::password::hash_password;

pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct SignupUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SignupUseCase<U> {
    /// Checks run in a fixed order and the first failure wins: required
    /// fields, email shape, email uniqueness, password policy, username
    /// uniqueness.
    pub async fn execute(&self, input: SignupInput) -> Result<User, PortalError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(PortalError::MissingFields);
        }

        if !is_valid_email(email) {
            return Err(PortalError::InvalidEmail);
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(PortalError::EmailTaken);
        }

        validate_password(&input.password, username, email).map_err(PortalError::WeakPassword)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(PortalError::UsernameTaken);
        }

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: hash_password(&input.password)?,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}
