//! # Key Lifecycle
//!
//! Requesting, activating, suspending and deleting API keys.
//!
//! Status changes are computed by [`transition`] and written with the
//! repository's conditional update, so two concurrent activations of the
//! same token cannot both perform the Pending to Active step.

use std::sync::Arc;

use tracing::{info, warn};

use super::crypto::{generate_key, generate_token, hash_token};
use super::email::{ActivationNotice, ActivationNotifier};
use super::errors::{KeyError, KeyResult};
use super::model::{transition, ApiKey, KeyEvent, KeyStatus, Transition};
use super::repository::ApiKeyRepository;
use super::request::KeyRequest;

/// Attempts at drawing an unused key before giving up
const MAX_KEY_ATTEMPTS: usize = 8;

/// Attempts at a conditional update that keeps losing to other writers
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// A freshly requested key
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub key: ApiKey,
    /// Carries the raw token; it is not stored anywhere else
    pub activation_link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// This call moved the key from Pending to Active
    Activated,
    /// The key was already active
    AlreadyActive,
}

#[derive(Debug, Clone)]
pub struct Activation {
    pub key: ApiKey,
    pub outcome: ActivationOutcome,
}

/// Owner of API key state changes
#[derive(Clone)]
pub struct LifecycleManager {
    repo: Arc<dyn ApiKeyRepository>,
    notifier: Arc<dyn ActivationNotifier>,
    activation_base_url: String,
}

impl LifecycleManager {
    pub fn new(
        repo: Arc<dyn ApiKeyRepository>,
        notifier: Arc<dyn ActivationNotifier>,
        activation_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            notifier,
            activation_base_url: activation_base_url.into(),
        }
    }

    pub fn repository(&self) -> &Arc<dyn ApiKeyRepository> {
        &self.repo
    }

    /// Validate a request, persist a pending key and send its activation link
    ///
    /// A failed notification is logged; the pending key stays persisted.
    pub fn request_key(&self, request: &KeyRequest) -> KeyResult<IssuedKey> {
        request.validate()?;

        let key = self.unique_key()?;
        let token = generate_token();

        let record = ApiKey::pending(
            key,
            request.name.trim().to_string(),
            request.email.trim().to_string(),
            request.usage_description(),
            hash_token(&token),
        );
        self.repo.create(&record)?;

        let activation_link = self.activation_link(&token);
        info!(key = %record.key, email = %record.email, "API key requested");

        let notice = ActivationNotice {
            email: record.email.clone(),
            owner_name: record.owner_name.clone(),
            activation_link: activation_link.clone(),
        };
        if let Err(e) = self.notifier.notify(&notice) {
            warn!(key = %record.key, error = %e, "activation notice not delivered");
        }

        Ok(IssuedKey {
            key: record,
            activation_link,
        })
    }

    /// Activate the pending key holding `token`
    pub fn activate(&self, token: &str) -> KeyResult<Activation> {
        let digest = hash_token(token.trim());
        let record = self
            .repo
            .find_by_token_digest(&digest)?
            .ok_or(KeyError::TokenNotFound)?;

        match transition(record.status, KeyEvent::Activate)? {
            Transition::Unchanged => Ok(Activation {
                key: record,
                outcome: ActivationOutcome::AlreadyActive,
            }),
            Transition::Changed(new_status) => {
                if self
                    .repo
                    .update_status_if(&record.key, record.status, new_status, true)?
                {
                    let key = self
                        .repo
                        .find_by_key(&record.key)?
                        .ok_or(KeyError::TokenNotFound)?;
                    info!(key = %key.key, "API key activated");
                    Ok(Activation {
                        key,
                        outcome: ActivationOutcome::Activated,
                    })
                } else {
                    self.recheck_activation(&record.key)
                }
            }
        }
    }

    /// Someone else changed the key first; report what they left behind
    fn recheck_activation(&self, key: &str) -> KeyResult<Activation> {
        let current = self
            .repo
            .find_by_key(key)?
            .ok_or(KeyError::TokenNotFound)?;

        match transition(current.status, KeyEvent::Activate)? {
            Transition::Unchanged => Ok(Activation {
                key: current,
                outcome: ActivationOutcome::AlreadyActive,
            }),
            Transition::Changed(_) => Err(KeyError::StorageError(
                "Activation lost a conditional update but key is still pending".to_string(),
            )),
        }
    }

    /// Suspend a key; suspending a suspended key is a no-op
    pub fn suspend(&self, key: &str) -> KeyResult<ApiKey> {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let record = self
                .repo
                .find_by_key(key)?
                .ok_or_else(|| KeyError::KeyNotFound(key.to_string()))?;

            match transition(record.status, KeyEvent::Suspend)? {
                Transition::Unchanged => return Ok(record),
                Transition::Changed(new_status) => {
                    if self
                        .repo
                        .update_status_if(key, record.status, new_status, false)?
                    {
                        info!(key = %key, from = %record.status, "API key suspended");
                        return Ok(ApiKey {
                            status: new_status,
                            ..record
                        });
                    }
                }
            }
        }

        Err(KeyError::StorageError(format!(
            "Key {} kept changing during suspension",
            key
        )))
    }

    /// Remove a key entirely
    pub fn delete(&self, key: &str) -> KeyResult<()> {
        if self.repo.delete(key)? {
            info!(key = %key, "API key deleted");
            Ok(())
        } else {
            Err(KeyError::KeyNotFound(key.to_string()))
        }
    }

    pub fn find(&self, key: &str) -> KeyResult<Option<ApiKey>> {
        self.repo.find_by_key(key)
    }

    pub fn list(&self) -> KeyResult<Vec<ApiKey>> {
        self.repo.list()
    }

    /// Count of keys per status, for the CLI summary
    pub fn status_counts(&self) -> KeyResult<[(KeyStatus, usize); 3]> {
        let keys = self.repo.list()?;
        let count = |status| keys.iter().filter(|k| k.status == status).count();
        Ok([
            (KeyStatus::Pending, count(KeyStatus::Pending)),
            (KeyStatus::Active, count(KeyStatus::Active)),
            (KeyStatus::Suspended, count(KeyStatus::Suspended)),
        ])
    }

    fn unique_key(&self) -> KeyResult<String> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = generate_key();
            if !self.repo.key_exists(&key)? {
                return Ok(key);
            }
        }
        Err(KeyError::StorageError(
            "Could not generate a unique API key".to_string(),
        ))
    }

    fn activation_link(&self, token: &str) -> String {
        format!(
            "{}/api_keys/activate/{}",
            self.activation_base_url.trim_end_matches('/'),
            token
        )
    }
}

/// Raw token from an activation link
pub fn token_from_link(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::email::MockActivationNotifier;
    use crate::keys::repository::InMemoryApiKeyRepository;

    fn manager() -> (LifecycleManager, Arc<MockActivationNotifier>) {
        let notifier = Arc::new(MockActivationNotifier::new());
        let manager = LifecycleManager::new(
            Arc::new(InMemoryApiKeyRepository::new()),
            notifier.clone(),
            "http://localhost:8080/",
        );
        (manager, notifier)
    }

    fn request() -> KeyRequest {
        KeyRequest {
            name: "Jo".into(),
            email: "jo@example.org".into(),
            usage: vec!["research".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_request_persists_pending_and_notifies() {
        let (manager, notifier) = manager();
        let issued = manager.request_key(&request()).unwrap();

        assert_eq!(issued.key.status, KeyStatus::Pending);
        assert!(issued
            .activation_link
            .starts_with("http://localhost:8080/api_keys/activate/"));
        assert_eq!(notifier.sent_count(), 1);

        let stored = manager.find(&issued.key.key).unwrap().unwrap();
        let token = token_from_link(&issued.activation_link);
        assert_eq!(stored.authorize_token, Some(hash_token(token)));
    }

    #[test]
    fn test_activate_then_replay() {
        let (manager, _) = manager();
        let issued = manager.request_key(&request()).unwrap();
        let token = token_from_link(&issued.activation_link);

        let activation = manager.activate(token).unwrap();
        assert_eq!(activation.outcome, ActivationOutcome::Activated);
        assert_eq!(activation.key.status, KeyStatus::Active);
        assert!(activation.key.authorize_token.is_none());

        assert_eq!(manager.activate(token).unwrap_err(), KeyError::TokenNotFound);
    }

    #[test]
    fn test_suspension_is_sticky() {
        let (manager, _) = manager();
        let issued = manager.request_key(&request()).unwrap();
        let token = token_from_link(&issued.activation_link);

        manager.suspend(&issued.key.key).unwrap();
        assert_eq!(manager.activate(token).unwrap_err(), KeyError::AlreadySuspended);

        let stored = manager.find(&issued.key.key).unwrap().unwrap();
        assert_eq!(stored.status, KeyStatus::Suspended);
    }

    #[test]
    fn test_notification_failure_keeps_key() {
        let manager = LifecycleManager::new(
            Arc::new(InMemoryApiKeyRepository::new()),
            Arc::new(MockActivationNotifier::failing()),
            "http://localhost:8080",
        );
        let issued = manager.request_key(&request()).unwrap();
        assert!(manager.find(&issued.key.key).unwrap().is_some());
    }

    #[test]
    fn test_invalid_request_persists_nothing() {
        let (manager, notifier) = manager();
        let err = manager
            .request_key(&KeyRequest::default())
            .unwrap_err();
        assert!(matches!(err, KeyError::Validation(_)));
        assert!(manager.list().unwrap().is_empty());
        assert_eq!(notifier.sent_count(), 0);
    }

    #[test]
    fn test_unknown_token() {
        let (manager, _) = manager();
        assert_eq!(manager.activate("nope").unwrap_err(), KeyError::TokenNotFound);
    }

    #[test]
    fn test_delete_and_suspend_unknown() {
        let (manager, _) = manager();
        assert!(matches!(manager.delete("nope"), Err(KeyError::KeyNotFound(_))));
        assert!(matches!(manager.suspend("nope"), Err(KeyError::KeyNotFound(_))));
    }

    #[test]
    fn test_status_counts() {
        let (manager, _) = manager();
        let a = manager.request_key(&request()).unwrap();
        manager.request_key(&request()).unwrap();
        manager.suspend(&a.key.key).unwrap();

        let counts = manager.status_counts().unwrap();
        assert_eq!(counts[0], (KeyStatus::Pending, 1));
        assert_eq!(counts[2], (KeyStatus::Suspended, 1));
    }
}
