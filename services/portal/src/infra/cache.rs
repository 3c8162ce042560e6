use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError};

use crate::domain::repository::PendingLoginStore;
use crate::domain::types::PendingLogin;
use crate::error::PortalError;

#[derive(Clone)]
pub struct RedisPendingLoginStore {
    pub pool: Pool,
}

fn pending_key(pending_id: &str) -> String {
    format!("pending_login:{pending_id}")
}

fn decode(raw: Option<Vec<u8>>) -> Result<Option<PendingLogin>, PortalError> {
    let Some(bytes) = raw else {
        return Ok(None);
    };
    let pending: PendingLogin =
        serde_json::from_slice(&bytes).map_err(|e| PortalError::Internal(e.into()))?;
    // Redis TTL and `expires_at` agree in practice; the timestamp is authoritative.
    Ok(pending.is_valid().then_some(pending))
}

impl PendingLoginStore for RedisPendingLoginStore {
    async fn put(
        &self,
        pending_id: &str,
        pending: &PendingLogin,
        ttl_secs: u64,
    ) -> Result<(), PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let payload = serde_json::to_vec(pending).map_err(|e| PortalError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(pending_key(pending_id), payload, ttl_secs)
            .await
            .map_err(|e: RedisError| PortalError::Internal(e.into()))?;
        Ok(())
    }

    async fn get(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let raw: Option<Vec<u8>> = conn
            .get(pending_key(pending_id))
            .await
            .map_err(|e: RedisError| PortalError::Internal(e.into()))?;
        decode(raw)
    }

    async fn take(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| PortalError::Internal(e.into()))?;
        let raw: Option<Vec<u8>> = conn
            .get_del(pending_key(pending_id))
            .await
            .map_err(|e: RedisError| PortalError::Internal(e.into()))?;
        decode(raw)
    }
}

/// Process-local markers for a single portal instance. Expiry is enforced on
/// read through `expires_at`; stale entries are pruned on every write.
#[derive(Clone, Default)]
pub struct InMemoryPendingLoginStore {
    markers: Arc<Mutex<HashMap<String, PendingLogin>>>,
}

impl InMemoryPendingLoginStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, PendingLogin>>, PortalError> {
        self.markers
            .lock()
            .map_err(|_| PortalError::Internal(anyhow::anyhow!("pending login store poisoned")))
    }
}

impl PendingLoginStore for InMemoryPendingLoginStore {
    async fn put(
        &self,
        pending_id: &str,
        pending: &PendingLogin,
        _ttl_secs: u64,
    ) -> Result<(), PortalError> {
        let mut markers = self.lock()?;
        markers.retain(|_, p| p.is_valid());
        markers.insert(pending_id.to_owned(), pending.clone());
        Ok(())
    }

    async fn get(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        Ok(self
            .lock()?
            .get(pending_id)
            .filter(|p| p.is_valid())
            .cloned())
    }

    async fn take(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        Ok(self.lock()?.remove(pending_id).filter(|p| p.is_valid()))
    }
}

/// The pending-login backend held in application state.
#[derive(Clone)]
pub enum PendingLogins {
    Redis(RedisPendingLoginStore),
    InMemory(InMemoryPendingLoginStore),
}

impl PendingLoginStore for PendingLogins {
    async fn put(
        &self,
        pending_id: &str,
        pending: &PendingLogin,
        ttl_secs: u64,
    ) -> Result<(), PortalError> {
        match self {
            Self::Redis(store) => store.put(pending_id, pending, ttl_secs).await,
            Self::InMemory(store) => store.put(pending_id, pending, ttl_secs).await,
        }
    }

    async fn get(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        match self {
            Self::Redis(store) => store.get(pending_id).await,
            Self::InMemory(store) => store.get(pending_id).await,
        }
    }

    async fn take(&self, pending_id: &str) -> Result<Option<PendingLogin>, PortalError> {
        match self {
            Self::Redis(store) => store.take(pending_id).await,
            Self::InMemory(store) => store.take(pending_id).await,
        }
    }
}
