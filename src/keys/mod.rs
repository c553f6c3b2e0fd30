//! # API Keys
//!
//! Key requests, activation links, administrative suspension and the
//! repositories that persist keys.
//!
//! ## Statuses
//! - `Pending` (0): requested, activation token outstanding
//! - `Active` (1): may call the data API
//! - `Suspended` (2): blocked; activation links no longer work

pub mod crypto;
pub mod email;
pub mod errors;
pub mod file_store;
pub mod lifecycle;
pub mod model;
pub mod repository;
pub mod request;

pub use email::{
    create_notifier, ActivationNotice, ActivationNotifier, EmailConfig, MockActivationNotifier,
    SmtpActivationNotifier,
};
pub use errors::{KeyError, KeyResult};
pub use file_store::FileApiKeyRepository;
pub use lifecycle::{Activation, ActivationOutcome, IssuedKey, LifecycleManager};
pub use model::{transition, ApiKey, KeyEvent, KeyStatus, Transition};
pub use repository::{ApiKeyRepository, InMemoryApiKeyRepository};
pub use request::{KeyRequest, USAGE_CATEGORIES};
