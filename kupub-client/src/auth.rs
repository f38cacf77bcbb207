//! Admin authentication state
//!
//! The auth blob (`user` + both tokens) lives under `kupub_admin_auth`.
//! [`AuthStore`] is cheap to clone; all clones share one in-memory copy
//! backed by the same storage.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::client::{AuthUser, LoginResponse};
use std::sync::{Arc, PoisonError, RwLock};

use crate::storage::{SharedStore, StorageError, StorageKey, TypedStorage};

/// Persisted auth blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuth {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<LoginResponse> for StoredAuth {
    fn from(resp: LoginResponse) -> Self {
        let user = resp.user();
        Self {
            user,
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        }
    }
}

#[derive(Debug)]
struct AuthInner {
    storage: SharedStore,
    current: RwLock<Option<StoredAuth>>,
}

#[derive(Debug, Clone)]
pub struct AuthStore {
    inner: Arc<AuthInner>,
}

impl AuthStore {
    /// Open the store, restoring any persisted auth
    pub fn new(storage: SharedStore) -> Self {
        let current = storage.load::<StoredAuth>(&StorageKey::AdminAuth.as_key());
        if let Some(auth) = &current {
            tracing::debug!(username = %auth.user.username, "Restored admin auth");
        }
        Self {
            inner: Arc::new(AuthInner {
                storage,
                current: RwLock::new(current),
            }),
        }
    }

    pub fn get(&self) -> Option<StoredAuth> {
        self.read().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.read().as_ref().map(|a| a.user.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|a| a.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().map(|a| a.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|a| !a.access_token.is_empty())
    }

    pub fn set(&self, auth: StoredAuth) -> Result<(), StorageError> {
        self.inner
            .storage
            .save(&StorageKey::AdminAuth.as_key(), &auth)?;
        tracing::info!(username = %auth.user.username, role = ?auth.user.role, "Admin auth stored");
        *self.write() = Some(auth);
        Ok(())
    }

    /// Swap in a refreshed access token, keeping user and refresh token
    pub fn update_access_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self.write();
        let Some(auth) = guard.as_mut() else {
            return Ok(());
        };
        auth.access_token = token.into();
        self.inner
            .storage
            .save(&StorageKey::AdminAuth.as_key(), &*auth)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        *self.write() = None;
        self.inner.storage.remove(&StorageKey::AdminAuth.as_key())?;
        tracing::info!("Admin auth cleared");
        Ok(())
    }

    /// Re-read the persisted blob after an external change
    pub fn reload(&self) {
        let current = self
            .inner
            .storage
            .load::<StoredAuth>(&StorageKey::AdminAuth.as_key());
        *self.write() = current;
    }

    /// Expiry of the current access token, from its `exp` claim
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let token = self.access_token()?;
        let exp = parse_jwt_exp(&token)?;
        DateTime::<Utc>::from_timestamp(exp, 0)
    }

    /// `true` only when the token carries an `exp` claim in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry().is_some_and(|exp| exp <= now)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<StoredAuth>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<StoredAuth>> {
        self.inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Extract the `exp` claim (Unix seconds) from a JWT without verifying it
pub fn parse_jwt_exp(token: &str) -> Option<i64> {
    // header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).ok()?;
    payload.get("exp")?.as_i64()
}
