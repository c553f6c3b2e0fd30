//! File Key Store Tests
//!
//! The JSON key store must carry key state across process restarts and
//! stay consistent under concurrent writers in one process.

use std::fs;
use std::sync::Arc;
use std::thread;

use peoplegroups_api::keys::lifecycle::token_from_link;
use peoplegroups_api::keys::{
    ApiKeyRepository, FileApiKeyRepository, KeyRequest, KeyStatus, LifecycleManager,
    MockActivationNotifier,
};
use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn lifecycle(repo: Arc<FileApiKeyRepository>) -> (LifecycleManager, Arc<MockActivationNotifier>) {
    let notifier = Arc::new(MockActivationNotifier::new());
    (
        LifecycleManager::new(repo, notifier.clone(), "http://localhost:8080"),
        notifier,
    )
}

fn request(n: usize) -> KeyRequest {
    KeyRequest {
        name: format!("Owner {n}"),
        email: format!("owner{n}@example.org"),
        usage: vec!["ministry".into()],
        ..Default::default()
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_activation_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keys/api_keys.json");

    let (key, token) = {
        let (manager, notifier) = lifecycle(Arc::new(FileApiKeyRepository::new(&path)));
        let issued = manager.request_key(&request(1)).unwrap();
        let notice = notifier.last().unwrap();
        (issued.key.key, token_from_link(&notice.activation_link).to_string())
    };

    // A fresh process activates with the mailed link
    {
        let (manager, _) = lifecycle(Arc::new(FileApiKeyRepository::new(&path)));
        manager.activate(&token).unwrap();
    }

    let repo = FileApiKeyRepository::new(&path);
    let stored = repo.find_by_key(&key).unwrap().unwrap();
    assert_eq!(stored.status, KeyStatus::Active);
    assert!(stored.authorize_token.is_none());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_status_stored_as_integer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api_keys.json");
    let (manager, _) = lifecycle(Arc::new(FileApiKeyRepository::new(&path)));

    let issued = manager.request_key(&request(1)).unwrap();
    manager.suspend(&issued.key.key).unwrap();

    let content: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(content[0]["status"], Value::from(2));
    assert_eq!(content[0]["email"], Value::from("owner1@example.org"));
}

#[test]
fn test_concurrent_requests_all_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api_keys.json");
    let repo = Arc::new(FileApiKeyRepository::new(&path));
    let (manager, notifier) = lifecycle(repo);

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let manager = manager.clone();
            thread::spawn(move || manager.request_key(&request(n)).map(|issued| issued.key.key))
        })
        .collect();
    let mut keys: Vec<String> = handles
        .into_iter()
        .map(|t| t.join().unwrap().unwrap())
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 6);

    let reopened = FileApiKeyRepository::new(&path);
    assert_eq!(reopened.list().unwrap().len(), 6);
    assert_eq!(notifier.sent_count(), 6);
}

#[test]
fn test_delete_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api_keys.json");
    let (manager, _) = lifecycle(Arc::new(FileApiKeyRepository::new(&path)));

    let keep = manager.request_key(&request(1)).unwrap();
    let drop = manager.request_key(&request(2)).unwrap();
    manager.delete(&drop.key.key).unwrap();

    let reopened = FileApiKeyRepository::new(&path);
    let remaining: Vec<String> = reopened.list().unwrap().into_iter().map(|k| k.key).collect();
    assert_eq!(remaining, vec![keep.key.key]);
}
