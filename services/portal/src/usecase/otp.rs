use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use zerogate_auth_types::token::issue_session_token;

use crate::domain::repository::{PendingLoginStore, TotpDeviceRepository, UserRepository};
use crate::domain::types::{OTP_DEVICE_NAME, PendingLogin, TotpDevice, User};
use crate::error::PortalError;
use crate::infra::totp::TotpService;

/// Resolve a pending marker to its user. A marker whose user has vanished is
/// dropped so the next attempt starts over at login.
async fn pending_user<U, P>(
    users: &U,
    pending: &P,
    pending_id: &str,
) -> Result<(PendingLogin, User), PortalError>
where
    U: UserRepository,
    P: PendingLoginStore,
{
    let marker = pending
        .get(pending_id)
        .await?
        .ok_or(PortalError::PendingLoginMissing)?;

    match users.find_by_id(marker.user_id).await? {
        Some(user) => Ok((marker, user)),
        None => {
            pending.take(pending_id).await?;
            tracing::warn!(user_id = %marker.user_id, "pending login for unknown user dropped");
            Err(PortalError::PendingUserMissing)
        }
    }
}

// ── ProvisionDevice ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Provisioning {
    /// A device was just created; show the QR code for scanning.
    Enrolled {
        qr_code: String,
        provisioning_uri: String,
        secret: String,
    },
    AlreadyEnrolled,
}

pub struct ProvisionDeviceUseCase<U, D, P>
where
    U: UserRepository,
    D: TotpDeviceRepository,
    P: PendingLoginStore,
{
    pub users: U,
    pub devices: D,
    pub pending: P,
    pub totp: Arc<TotpService>,
}

impl<U, D, P> ProvisionDeviceUseCase<U, D, P>
where
    U: UserRepository,
    D: TotpDeviceRepository,
    P: PendingLoginStore,
{
    pub async fn execute(&self, pending_id: &str) -> Result<Provisioning, PortalError> {
        let (_, user) = pending_user(&self.users, &self.pending, pending_id).await?;

        if self.devices.find_by_user(user.id).await?.is_some() {
            return Ok(Provisioning::AlreadyEnrolled);
        }

        let secret = TotpService::generate_secret();
        let provisioning_uri = self.totp.provisioning_uri(&secret, &user.email)?;
        let qr_code = self.totp.qr_code_png_base64(&secret, &user.email)?;

        let device = TotpDevice {
            id: Uuid::now_v7(),
            user_id: user.id,
            name: OTP_DEVICE_NAME.to_owned(),
            key: secret.clone(),
            created_at: Utc::now(),
        };
        if !self.devices.create(&device).await? {
            // A concurrent request enrolled this user first; its secret stands.
            tracing::info!(user_id = %user.id, "totp device already provisioned");
            return Ok(Provisioning::AlreadyEnrolled);
        }

        tracing::info!(user_id = %user.id, "totp device provisioned");
        Ok(Provisioning::Enrolled {
            qr_code,
            provisioning_uri,
            secret,
        })
    }
}

// ── VerifyOtp (second factor) ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct VerifiedLogin {
    pub user: User,
    pub session_token: String,
    pub session_exp: u64,
}

pub struct VerifyOtpUseCase<U, D, P>
where
    U: UserRepository,
    D: TotpDeviceRepository,
    P: PendingLoginStore,
{
    pub users: U,
    pub devices: D,
    pub pending: P,
    pub totp: Arc<TotpService>,
    pub session_secret: String,
    pub session_ttl_secs: u64,
}

impl<U, D, P> VerifyOtpUseCase<U, D, P>
where
    U: UserRepository,
    D: TotpDeviceRepository,
    P: PendingLoginStore,
{
    /// Check `code` for the pending login. On success the marker is consumed
    /// and a session token issued; on a wrong code the marker is left alone.
    pub async fn execute(&self, pending_id: &str, code: &str) -> Result<VerifiedLogin, PortalError> {
        let (_, user) = pending_user(&self.users, &self.pending, pending_id).await?;

        let device = self
            .devices
            .find_by_user(user.id)
            .await?
            .ok_or(PortalError::DeviceMissing)?;

        if !self.totp.verify(&device.key, code.trim())? {
            tracing::info!(user_id = %user.id, "otp rejected");
            return Err(PortalError::InvalidOtp);
        }

        // A concurrent request may have consumed the marker first.
        self.pending
            .take(pending_id)
            .await?
            .ok_or(PortalError::PendingLoginMissing)?;

        let (session_token, session_exp) = issue_session_token(
            user.id,
            &user.username,
            &self.session_secret,
            self.session_ttl_secs,
        )
        .map_err(|e| PortalError::Internal(e.into()))?;

        tracing::info!(user_id = %user.id, "login completed");
        Ok(VerifiedLogin {
            user,
            session_token,
            session_exp,
        })
    }
}
