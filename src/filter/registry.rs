//! # Filter Registry
//!
//! Immutable map from resource to its filter table, built once at startup
//! and shared read-only between requests.

use std::collections::HashMap;

use super::resources;
use super::spec::{ResourceName, ResourceSpec};

/// Per-resource filter tables
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    resources: HashMap<ResourceName, ResourceSpec>,
}

impl FilterRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry served by the API
    pub fn standard() -> Self {
        Self::new()
            .with_resource(resources::people_groups())
            .with_resource(resources::daily_unreached())
            .with_resource(resources::countries())
            .with_resource(resources::languages())
            .with_resource(resources::regions())
            .with_resource(resources::continents())
    }

    /// Add or replace a resource
    pub fn with_resource(mut self, spec: ResourceSpec) -> Self {
        self.resources.insert(spec.name, spec);
        self
    }

    pub fn resource(&self, name: ResourceName) -> Option<&ResourceSpec> {
        self.resources.get(&name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_resource() {
        let registry = FilterRegistry::standard();
        assert_eq!(registry.len(), ResourceName::ALL.len());
        for name in ResourceName::ALL {
            let spec = registry.resource(name).unwrap();
            assert_eq!(spec.name, name);
        }
    }

    #[test]
    fn test_daily_unreached_requires_date() {
        let registry = FilterRegistry::standard();
        let spec = registry.resource(ResourceName::DailyUnreached).unwrap();
        assert_eq!(spec.required_params(), &["month", "day"]);
    }

    #[test]
    fn test_retired_parameters() {
        let registry = FilterRegistry::standard();
        let people = registry.resource(ResourceName::PeopleGroups).unwrap();
        assert!(people.is_retired("pc_adherent"));
        assert!(!people.is_retired("pc_christianity"));
    }
}
