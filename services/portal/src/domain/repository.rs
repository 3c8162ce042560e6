#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{Booking, PendingLogin, TotpDevice, User};
use crate::error::PortalError;

/// Repository for registered accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError>;
    async fn create(&self, user: &User) -> Result<(), PortalError>;
}

/// Repository for TOTP devices (at most one per user).
pub trait TotpDeviceRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TotpDevice>, PortalError>;
    /// Returns false when the user already has a device.
    async fn create(&self, device: &TotpDevice) -> Result<bool, PortalError>;
}

pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<(), PortalError>;
}

/// Short-lived store for pending-login markers (Redis, TTL-bound).
pub trait PendingLoginStore: Send + Sync {
    async fn put(
        &self,
        pending_id: &str,
        pending: &PendingLogin,
        ttl_secs: u64,
    ) -> Result<(), PortalError>;

    /// Read a marker without consuming it.
    async fn get(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError>;

    /// Read and delete a marker atomically.
    async fn take(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError>;
}
