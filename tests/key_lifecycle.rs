//! API Key Lifecycle Tests
//!
//! Request, activation, suspension and access checks through the public
//! lifecycle manager and access gate, including racing activations.

use std::sync::Arc;
use std::thread;

use peoplegroups_api::access::AccessGate;
use peoplegroups_api::keys::lifecycle::token_from_link;
use peoplegroups_api::keys::{
    ActivationOutcome, InMemoryApiKeyRepository, KeyError, KeyRequest, KeyStatus,
    LifecycleManager, MockActivationNotifier,
};
use peoplegroups_api::validation::ValidationError;

// =============================================================================
// Test Utilities
// =============================================================================

struct Harness {
    lifecycle: LifecycleManager,
    notifier: Arc<MockActivationNotifier>,
    gate: AccessGate,
}

fn harness() -> Harness {
    let repo = Arc::new(InMemoryApiKeyRepository::new());
    let notifier = Arc::new(MockActivationNotifier::new());
    let lifecycle = LifecycleManager::new(repo.clone(), notifier.clone(), "https://api.example.org");
    Harness {
        lifecycle,
        notifier,
        gate: AccessGate::new(repo),
    }
}

fn request() -> KeyRequest {
    KeyRequest {
        name: "Ada Researcher".into(),
        email: "ada@example.org".into(),
        usage: vec!["research".into(), "website".into()],
        website_url: Some("https://ada.example.org".into()),
        other_purpose: None,
    }
}

fn mailed_token(h: &Harness) -> String {
    let notice = h.notifier.last().expect("activation notice sent");
    token_from_link(&notice.activation_link).to_string()
}

// =============================================================================
// Requesting Keys
// =============================================================================

#[test]
fn test_request_creates_pending_key_and_mails_link() {
    let h = harness();
    let issued = h.lifecycle.request_key(&request()).unwrap();

    assert_eq!(issued.key.status, KeyStatus::Pending);
    assert_eq!(issued.key.owner_name, "Ada Researcher");
    assert!(issued
        .activation_link
        .starts_with("https://api.example.org/api_keys/activate/"));
    assert_eq!(h.notifier.sent_count(), 1);

    // Only the digest is stored
    let token = mailed_token(&h);
    let stored = h.lifecycle.find(&issued.key.key).unwrap().unwrap();
    assert_ne!(stored.authorize_token.as_deref(), Some(token.as_str()));
}

#[test]
fn test_website_usage_needs_url() {
    let h = harness();
    let err = h
        .lifecycle
        .request_key(&KeyRequest {
            website_url: None,
            ..request()
        })
        .unwrap_err();

    assert_eq!(
        err,
        KeyError::Validation(ValidationError::MissingRequired {
            names: vec!["website_url".into()]
        })
    );
    assert_eq!(h.notifier.sent_count(), 0);
    assert!(h.lifecycle.list().unwrap().is_empty());
}

#[test]
fn test_bad_email_and_unknown_usage() {
    let h = harness();
    let err = h
        .lifecycle
        .request_key(&KeyRequest {
            email: "not-an-address".into(),
            ..request()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        KeyError::Validation(ValidationError::InvalidEmail { .. })
    ));

    let err = h
        .lifecycle
        .request_key(&KeyRequest {
            usage: vec!["espionage".into()],
            ..request()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        KeyError::Validation(ValidationError::InvalidEnum { .. })
    ));
}

#[test]
fn test_undeliverable_notice_keeps_pending_key() {
    let repo = Arc::new(InMemoryApiKeyRepository::new());
    let lifecycle = LifecycleManager::new(
        repo,
        Arc::new(MockActivationNotifier::failing()),
        "https://api.example.org",
    );

    let issued = lifecycle.request_key(&request()).unwrap();
    let stored = lifecycle.find(&issued.key.key).unwrap().unwrap();
    assert_eq!(stored.status, KeyStatus::Pending);
}

// =============================================================================
// Activation And Access
// =============================================================================

#[test]
fn test_activation_opens_the_gate() {
    let h = harness();
    let issued = h.lifecycle.request_key(&request()).unwrap();

    assert_eq!(
        h.gate.authorize(Some(&issued.key.key)).unwrap_err(),
        KeyError::InvalidKey
    );

    let activation = h.lifecycle.activate(&mailed_token(&h)).unwrap();
    assert_eq!(activation.outcome, ActivationOutcome::Activated);
    assert_eq!(activation.key.status, KeyStatus::Active);
    assert!(activation.key.authorize_token.is_none());

    let admitted = h.gate.authorize(Some(&issued.key.key)).unwrap();
    assert!(admitted.last_request_at.is_some());
    let stored = h.lifecycle.find(&issued.key.key).unwrap().unwrap();
    assert!(stored.last_request_at.is_some());
}

#[test]
fn test_replayed_link_is_not_found() {
    let h = harness();
    h.lifecycle.request_key(&request()).unwrap();
    let token = mailed_token(&h);

    h.lifecycle.activate(&token).unwrap();
    assert_eq!(
        h.lifecycle.activate(&token).unwrap_err(),
        KeyError::TokenNotFound
    );
    assert_eq!(
        h.lifecycle.activate("made-up-token").unwrap_err(),
        KeyError::TokenNotFound
    );
}

#[test]
fn test_suspension_is_sticky() {
    let h = harness();
    let issued = h.lifecycle.request_key(&request()).unwrap();
    let token = mailed_token(&h);

    let suspended = h.lifecycle.suspend(&issued.key.key).unwrap();
    assert_eq!(suspended.status, KeyStatus::Suspended);

    assert_eq!(
        h.lifecycle.activate(&token).unwrap_err(),
        KeyError::AlreadySuspended
    );
    let stored = h.lifecycle.find(&issued.key.key).unwrap().unwrap();
    assert_eq!(stored.status, KeyStatus::Suspended);
    assert_eq!(
        h.gate.authorize(Some(&issued.key.key)).unwrap_err(),
        KeyError::InvalidKey
    );
}

#[test]
fn test_suspending_active_key_closes_the_gate() {
    let h = harness();
    let issued = h.lifecycle.request_key(&request()).unwrap();
    h.lifecycle.activate(&mailed_token(&h)).unwrap();
    h.gate.authorize(Some(&issued.key.key)).unwrap();

    h.lifecycle.suspend(&issued.key.key).unwrap();
    assert_eq!(
        h.gate.authorize(Some(&issued.key.key)).unwrap_err(),
        KeyError::InvalidKey
    );
}

#[test]
fn test_status_counts_and_delete() {
    let h = harness();
    let first = h.lifecycle.request_key(&request()).unwrap();
    h.lifecycle.activate(&mailed_token(&h)).unwrap();
    let second = h.lifecycle.request_key(&request()).unwrap();
    h.lifecycle.suspend(&second.key.key).unwrap();
    h.lifecycle.request_key(&request()).unwrap();

    let counts = h.lifecycle.status_counts().unwrap();
    assert_eq!(
        counts,
        [
            (KeyStatus::Pending, 1),
            (KeyStatus::Active, 1),
            (KeyStatus::Suspended, 1)
        ]
    );

    h.lifecycle.delete(&first.key.key).unwrap();
    assert!(matches!(
        h.lifecycle.delete(&first.key.key).unwrap_err(),
        KeyError::KeyNotFound(_)
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_racing_activations_transition_once() {
    let h = harness();
    let issued = h.lifecycle.request_key(&request()).unwrap();
    let token = mailed_token(&h);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let lifecycle = h.lifecycle.clone();
            let token = token.clone();
            thread::spawn(move || lifecycle.activate(&token))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();

    let activated = results
        .iter()
        .filter(|r| matches!(r, Ok(a) if a.outcome == ActivationOutcome::Activated))
        .count();
    assert_eq!(activated, 1);
    for result in &results {
        match result {
            Ok(activation) => assert_eq!(activation.key.status, KeyStatus::Active),
            Err(e) => assert_eq!(e, &KeyError::TokenNotFound),
        }
    }

    let stored = h.lifecycle.find(&issued.key.key).unwrap().unwrap();
    assert_eq!(stored.status, KeyStatus::Active);
}
