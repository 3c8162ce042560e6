use std::sync::Arc;

use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use zerogate_auth_types::cookie::CookieOptions;
use zerogate_auth_types::identity::SessionSecret;

use crate::config::PortalConfig;
use crate::infra::cache::{PendingLogins, RedisPendingLoginStore};
use crate::infra::db::{DbBookingRepository, DbTotpDeviceRepository, DbUserRepository};
use crate::infra::totp::TotpService;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub pending: PendingLogins,
    pub config: Arc<PortalConfig>,
    pub totp: Arc<TotpService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, redis: RedisPool, config: PortalConfig) -> Self {
        let pending = PendingLogins::Redis(RedisPendingLoginStore { pool: redis });
        Self::with_pending_store(db, pending, config)
    }

    pub fn with_pending_store(
        db: DatabaseConnection,
        pending: PendingLogins,
        config: PortalConfig,
    ) -> Self {
        let totp = TotpService::new(config.totp_issuer.clone(), config.totp_skew);
        Self {
            db: Arc::new(db),
            pending,
            config: Arc::new(config),
            totp: Arc::new(totp),
        }
    }

    pub fn cookie_options(&self) -> CookieOptions {
        self.config.cookie_options()
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn device_repo(&self) -> DbTotpDeviceRepository {
        DbTotpDeviceRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn booking_repo(&self) -> DbBookingRepository {
        DbBookingRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn pending_store(&self) -> PendingLogins {
        self.pending.clone()
    }
}

impl SessionSecret for AppState {
    fn session_secret(&self) -> &str {
        &self.config.session_secret
    }
}
