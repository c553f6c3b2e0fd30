//! # Key Model
//!
//! The persisted API key record and its status machine.
//!
//! Every status change goes through [`transition`]. A suspended key stays
//! suspended: replaying its activation link is rejected, never honoured.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{KeyError, KeyResult};

/// Key status, persisted as a small integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum KeyStatus {
    Pending = 0,
    Active = 1,
    Suspended = 2,
}

impl From<KeyStatus> for u8 {
    fn from(status: KeyStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for KeyStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KeyStatus::Pending),
            1 => Ok(KeyStatus::Active),
            2 => Ok(KeyStatus::Suspended),
            other => Err(format!("unknown key status {}", other)),
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyStatus::Pending => "pending",
            KeyStatus::Active => "active",
            KeyStatus::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

/// Something that may move a key between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Owner presented the activation token
    Activate,
    /// Administrator suspended the key
    Suspend,
}

/// Outcome of a legal event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed(KeyStatus),
    Unchanged,
}

/// The key status machine
pub fn transition(current: KeyStatus, event: KeyEvent) -> KeyResult<Transition> {
    match (current, event) {
        (KeyStatus::Pending, KeyEvent::Activate) => Ok(Transition::Changed(KeyStatus::Active)),
        (KeyStatus::Active, KeyEvent::Activate) => Ok(Transition::Unchanged),
        (KeyStatus::Suspended, KeyEvent::Activate) => Err(KeyError::AlreadySuspended),
        (KeyStatus::Pending | KeyStatus::Active, KeyEvent::Suspend) => {
            Ok(Transition::Changed(KeyStatus::Suspended))
        }
        (KeyStatus::Suspended, KeyEvent::Suspend) => Ok(Transition::Unchanged),
    }
}

/// Persisted API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    /// The key clients send as `api_key`
    pub key: String,

    pub owner_name: String,

    pub email: String,

    pub usage_description: String,

    pub status: KeyStatus,

    /// SHA-256 digest of the activation token; only set while pending
    #[serde(default)]
    pub authorize_token: Option<String>,

    #[serde(default)]
    pub last_request_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// New pending key holding the digest of its activation token
    pub fn pending(
        key: String,
        owner_name: String,
        email: String,
        usage_description: String,
        token_digest: String,
    ) -> Self {
        Self {
            key,
            owner_name,
            email,
            usage_description,
            status: KeyStatus::Pending,
            authorize_token: Some(token_digest),
            last_request_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }
}
