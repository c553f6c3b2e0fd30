//! # Key Repository
//!
//! Storage abstraction for API keys.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::crypto::constant_time_str_eq;
use super::errors::{KeyError, KeyResult};
use super::model::{ApiKey, KeyStatus};

/// API key repository trait
///
/// `update_status_if` is the only way status changes reach storage. It must
/// be atomic with respect to other calls on the same repository.
pub trait ApiKeyRepository: Send + Sync {
    /// Find a key by its public value
    fn find_by_key(&self, key: &str) -> KeyResult<Option<ApiKey>>;

    /// Find the key holding this activation token digest
    fn find_by_token_digest(&self, digest: &str) -> KeyResult<Option<ApiKey>>;

    /// Check whether a key value is taken
    fn key_exists(&self, key: &str) -> KeyResult<bool> {
        Ok(self.find_by_key(key)?.is_some())
    }

    /// Persist a new key; fails if the key value is taken
    fn create(&self, key: &ApiKey) -> KeyResult<()>;

    /// Set `new` status only if the current status is `expected`
    ///
    /// Returns whether the update happened. `clear_token` drops the stored
    /// activation token in the same step.
    fn update_status_if(
        &self,
        key: &str,
        expected: KeyStatus,
        new: KeyStatus,
        clear_token: bool,
    ) -> KeyResult<bool>;

    /// Record the time of the latest authorized request
    fn touch(&self, key: &str, at: DateTime<Utc>) -> KeyResult<()>;

    /// Remove a key; returns whether it existed
    fn delete(&self, key: &str) -> KeyResult<bool>;

    /// All keys, oldest first
    fn list(&self) -> KeyResult<Vec<ApiKey>>;
}

pub(crate) fn lock_poisoned() -> KeyError {
    KeyError::StorageError("Lock poisoned".to_string())
}

/// Token digest lookup shared by the repositories
pub(crate) fn find_token<'a>(keys: &'a [ApiKey], digest: &str) -> Option<&'a ApiKey> {
    keys.iter().find(|k| {
        k.authorize_token
            .as_deref()
            .is_some_and(|stored| constant_time_str_eq(stored, digest))
    })
}

/// Conditional status update shared by the repositories
pub(crate) fn apply_status_if(
    keys: &mut [ApiKey],
    key: &str,
    expected: KeyStatus,
    new: KeyStatus,
    clear_token: bool,
) -> bool {
    match keys.iter_mut().find(|k| k.key == key) {
        Some(existing) if existing.status == expected => {
            existing.status = new;
            if clear_token {
                existing.authorize_token = None;
            }
            true
        }
        _ => false,
    }
}

/// In-memory key repository
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: RwLock<Vec<ApiKey>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApiKeyRepository for InMemoryApiKeyRepository {
    fn find_by_key(&self, key: &str) -> KeyResult<Option<ApiKey>> {
        let keys = self.keys.read().map_err(|_| lock_poisoned())?;
        Ok(keys.iter().find(|k| k.key == key).cloned())
    }

    fn find_by_token_digest(&self, digest: &str) -> KeyResult<Option<ApiKey>> {
        let keys = self.keys.read().map_err(|_| lock_poisoned())?;
        Ok(find_token(&keys, digest).cloned())
    }

    fn create(&self, key: &ApiKey) -> KeyResult<()> {
        let mut keys = self.keys.write().map_err(|_| lock_poisoned())?;

        if keys.iter().any(|k| k.key == key.key) {
            return Err(KeyError::StorageError("Duplicate API key".to_string()));
        }

        keys.push(key.clone());
        Ok(())
    }

    fn update_status_if(
        &self,
        key: &str,
        expected: KeyStatus,
        new: KeyStatus,
        clear_token: bool,
    ) -> KeyResult<bool> {
        let mut keys = self.keys.write().map_err(|_| lock_poisoned())?;
        Ok(apply_status_if(&mut keys, key, expected, new, clear_token))
    }

    fn touch(&self, key: &str, at: DateTime<Utc>) -> KeyResult<()> {
        let mut keys = self.keys.write().map_err(|_| lock_poisoned())?;

        match keys.iter_mut().find(|k| k.key == key) {
            Some(existing) => {
                existing.last_request_at = Some(at);
                Ok(())
            }
            None => Err(KeyError::KeyNotFound(key.to_string())),
        }
    }

    fn delete(&self, key: &str) -> KeyResult<bool> {
        let mut keys = self.keys.write().map_err(|_| lock_poisoned())?;

        let len_before = keys.len();
        keys.retain(|k| k.key != key);
        Ok(keys.len() != len_before)
    }

    fn list(&self) -> KeyResult<Vec<ApiKey>> {
        let keys = self.keys.read().map_err(|_| lock_poisoned())?;
        Ok(keys.clone())
    }
}
