//! Shared handler state.

use std::sync::Arc;

use crate::access::AccessGate;
use crate::compat::FieldCompatibility;
use crate::filter::FilterRegistry;
use crate::keys::LifecycleManager;
use crate::store::DataStore;

/// Everything request handlers need, shared read-only between requests
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<FilterRegistry>,
    pub store: Arc<dyn DataStore>,
    pub compat: Arc<FieldCompatibility>,
    pub lifecycle: LifecycleManager,
    pub gate: AccessGate,
}

impl ApiState {
    /// Wire the standard registry around the given collaborators
    ///
    /// The access gate shares the lifecycle manager's key repository.
    pub fn new(
        store: Arc<dyn DataStore>,
        compat: FieldCompatibility,
        lifecycle: LifecycleManager,
    ) -> Self {
        let gate = AccessGate::new(Arc::clone(lifecycle.repository()));
        Self {
            registry: Arc::new(FilterRegistry::standard()),
            store,
            compat: Arc::new(compat),
            lifecycle,
            gate,
        }
    }
}
