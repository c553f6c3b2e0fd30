//! # File Key Repository
//!
//! API keys persisted as a JSON array in a single file.
//!
//! Every operation re-reads the file under one process-wide mutex, so
//! conditional updates are atomic for a single server process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::errors::{KeyError, KeyResult};
use super::model::{ApiKey, KeyStatus};
use super::repository::{apply_status_if, find_token, lock_poisoned, ApiKeyRepository};

/// JSON file-based key repository
#[derive(Debug)]
pub struct FileApiKeyRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileApiKeyRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_keys(&self) -> KeyResult<Vec<ApiKey>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| KeyError::StorageError(format!("Failed to read key store: {}", e)))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| KeyError::StorageError(format!("Failed to parse key store: {}", e)))
    }

    fn save_keys(&self, keys: &[ApiKey]) -> KeyResult<()> {
        let content = serde_json::to_string_pretty(keys)
            .map_err(|e| KeyError::StorageError(format!("Failed to serialize keys: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                KeyError::StorageError(format!("Failed to create key store directory: {}", e))
            })?;
        }

        // Write then rename so readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| KeyError::StorageError(format!("Failed to write key store: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| KeyError::StorageError(format!("Failed to replace key store: {}", e)))?;

        debug!(path = %self.path.display(), count = keys.len(), "key store written");
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<ApiKey>) -> KeyResult<(T, bool)>) -> KeyResult<T> {
        let _guard = self.lock.lock().map_err(|_| lock_poisoned())?;
        let mut keys = self.load_keys()?;
        let (result, dirty) = f(&mut keys)?;
        if dirty {
            self.save_keys(&keys)?;
        }
        Ok(result)
    }

    fn read(&self) -> KeyResult<Vec<ApiKey>> {
        let _guard = self.lock.lock().map_err(|_| lock_poisoned())?;
        self.load_keys()
    }
}

impl ApiKeyRepository for FileApiKeyRepository {
    fn find_by_key(&self, key: &str) -> KeyResult<Option<ApiKey>> {
        Ok(self.read()?.into_iter().find(|k| k.key == key))
    }

    fn find_by_token_digest(&self, digest: &str) -> KeyResult<Option<ApiKey>> {
        let keys = self.read()?;
        Ok(find_token(&keys, digest).cloned())
    }

    fn create(&self, key: &ApiKey) -> KeyResult<()> {
        self.modify(|keys| {
            if keys.iter().any(|k| k.key == key.key) {
                return Err(KeyError::StorageError("Duplicate API key".to_string()));
            }
            keys.push(key.clone());
            Ok(((), true))
        })
    }

    fn update_status_if(
        &self,
        key: &str,
        expected: KeyStatus,
        new: KeyStatus,
        clear_token: bool,
    ) -> KeyResult<bool> {
        self.modify(|keys| {
            let updated = apply_status_if(keys, key, expected, new, clear_token);
            Ok((updated, updated))
        })
    }

    fn touch(&self, key: &str, at: DateTime<Utc>) -> KeyResult<()> {
        self.modify(|keys| match keys.iter_mut().find(|k| k.key == key) {
            Some(existing) => {
                existing.last_request_at = Some(at);
                Ok(((), true))
            }
            None => Err(KeyError::KeyNotFound(key.to_string())),
        })
    }

    fn delete(&self, key: &str) -> KeyResult<bool> {
        self.modify(|keys| {
            let len_before = keys.len();
            keys.retain(|k| k.key != key);
            let removed = keys.len() != len_before;
            Ok((removed, removed))
        })
    }

    fn list(&self) -> KeyResult<Vec<ApiKey>> {
        self.read()
    }
}
