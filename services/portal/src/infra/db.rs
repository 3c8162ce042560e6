use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use zerogate_portal_schema::{bookings, totp_devices, users};

use crate::domain::repository::{BookingRepository, TotpDeviceRepository, UserRepository};
use crate::domain::types::{Booking, TotpDevice, User};
use crate::error::PortalError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), PortalError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at),
        }
        .insert(self.db.as_ref())
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a race with a concurrent signup between the lookup and the insert.
            Err(e) => match unique_violation(&e) {
                Some(constraint) if constraint.contains("email") => Err(PortalError::EmailTaken),
                Some(_) => Err(PortalError::UsernameTaken),
                None => Err(anyhow::Error::new(e).context("insert user").into()),
            },
        }
    }
}

fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => None,
    }
}

fn user_from_model(m: users::Model) -> User {
    User {
        id: m.id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        created_at: m.created_at,
    }
}

// ── TOTP device repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTotpDeviceRepository {
    pub db: Arc<DatabaseConnection>,
}

impl TotpDeviceRepository for DbTotpDeviceRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TotpDevice>, PortalError> {
        let model = totp_devices::Entity::find()
            .filter(totp_devices::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .context("find totp device by user")?;
        Ok(model.map(device_from_model))
    }

    async fn create(&self, device: &TotpDevice) -> Result<bool, PortalError> {
        let result = totp_devices::ActiveModel {
            id: Set(device.id),
            user_id: Set(device.user_id),
            name: Set(device.name.clone()),
            key: Set(device.key.clone()),
            created_at: Set(device.created_at),
        }
        .insert(self.db.as_ref())
        .await;

        match result {
            Ok(_) => Ok(true),
            // `user_id` is unique: another request enrolled this user first.
            Err(e) if unique_violation(&e).is_some() => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("insert totp device").into()),
        }
    }
}

fn device_from_model(m: totp_devices::Model) -> TotpDevice {
    TotpDevice {
        id: m.id,
        user_id: m.user_id,
        name: m.name,
        key: m.key,
        created_at: m.created_at,
    }
}

// ── Booking repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBookingRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BookingRepository for DbBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), PortalError> {
        bookings::ActiveModel {
            id: Set(booking.id),
            user_id: Set(booking.user_id),
            name: Set(booking.name.clone()),
            email: Set(booking.email.clone()),
            date: Set(booking.date),
            phone: Set(booking.phone.clone()),
            time: Set(booking.time),
            message: Set(booking.message.clone()),
            created_at: Set(booking.created_at),
        }
        .insert(self.db.as_ref())
        .await
        .context("insert booking")?;
        Ok(())
    }
}
