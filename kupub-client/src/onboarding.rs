//! "Onboarding already shown" flag, per department

use crate::storage::{KeyValueStore, SharedStore, StorageError, StorageKey};

const SEEN_MARKER: &str = "true";

#[derive(Debug, Clone)]
pub struct OnboardingFlag {
    storage: SharedStore,
}

impl OnboardingFlag {
    pub fn new(storage: SharedStore) -> Self {
        Self { storage }
    }

    pub fn seen(&self, dept: &str) -> bool {
        match self.storage.get(&StorageKey::OnboardingSeen(dept).as_key()) {
            Ok(value) => value.as_deref() == Some(SEEN_MARKER),
            Err(e) => {
                tracing::warn!(dept, error = %e, "Failed to read onboarding flag");
                false
            }
        }
    }

    pub fn mark_seen(&self, dept: &str) -> Result<(), StorageError> {
        self.storage
            .set(&StorageKey::OnboardingSeen(dept).as_key(), SEEN_MARKER)
    }

    /// Show the onboarding again on the next visit
    pub fn reset(&self, dept: &str) -> Result<(), StorageError> {
        self.storage.remove(&StorageKey::OnboardingSeen(dept).as_key())
    }
}
