//! Client-side key-value storage
//!
//! Every persisted piece of client state (cart, session snapshot, onboarding
//! flag, fees-paid flag, admin auth) goes through [`KeyValueStore`]. Writes
//! are announced on a broadcast channel so other stores sharing the same
//! backing storage can invalidate and re-read; this replaces ad-hoc
//! cross-tab sync events.
//!
//! - [`MemoryStore`]: in-process, for tests and ephemeral clients
//! - [`FileStore`]: one JSON file per key in a directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the change-notification channel
pub(crate) const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChange {
    Set,
    Removed,
}

/// A key was written or removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub change: StorageChange,
}

/// Raw string storage with change notification
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Receive every subsequent write and removal
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Storage handle shared between stores
pub type SharedStore = Arc<dyn KeyValueStore>;

/// JSON helpers over any [`KeyValueStore`]
pub trait TypedStorage {
    /// Decode the value under `key`.
    ///
    /// Read and decode failures are logged and treated as absent.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> TypedStorage for S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read storage key");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable storage value");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

/// Namespaced storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey<'a> {
    /// `kupub_cart_{dept}`
    Cart(&'a str),
    /// `kupub_session_{dept}`
    Session(&'a str),
    /// `kupub_onboarding_seen_{dept}`
    OnboardingSeen(&'a str),
    /// `kupub_fees_paid_{dept}[_{sessionId}]`
    FeesPaid {
        dept: &'a str,
        session_id: Option<i64>,
    },
    /// `kupub_admin_auth`
    AdminAuth,
}

impl StorageKey<'_> {
    pub fn as_key(&self) -> String {
        match self {
            StorageKey::Cart(dept) => format!("kupub_cart_{dept}"),
            StorageKey::Session(dept) => format!("kupub_session_{dept}"),
            StorageKey::OnboardingSeen(dept) => format!("kupub_onboarding_seen_{dept}"),
            StorageKey::FeesPaid { dept, session_id } => match session_id {
                Some(id) => format!("kupub_fees_paid_{dept}_{id}"),
                None => format!("kupub_fees_paid_{dept}"),
            },
            StorageKey::AdminAuth => "kupub_admin_auth".to_string(),
        }
    }
}

impl std::fmt::Display for StorageKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}
