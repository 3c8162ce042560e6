use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the opaque pending-login identifier carried in the pending cookie.
pub const PENDING_ID_LEN: usize = 32;

/// Label stored with every TOTP device.
pub const OTP_DEVICE_NAME: &str = "Google Authenticator";

/// Exact number of digits a booking phone number must have.
pub const PHONE_DIGITS: usize = 11;

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user's TOTP shared secret. At most one per user, never rotated.
#[derive(Debug, Clone)]
pub struct TotpDevice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Base32 (RFC 4648, unpadded) shared secret.
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Password checked, second factor outstanding. Lives in Redis under the
/// pending id until OTP success or expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingLogin {
    /// A TTL too large to represent saturates at the latest representable time.
    pub fn new(user_id: Uuid, ttl_secs: u64) -> Self {
        let created_at = Utc::now();
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            user_id,
            created_at,
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Raw booking form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub message: String,
}

/// A booking that passed validation, not yet owned or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub phone: String,
    pub time: NaiveTime,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub phone: String,
    pub time: NaiveTime,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
