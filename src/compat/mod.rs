//! # Field Compatibility
//!
//! Projects raw store rows onto the published shape of an API version:
//! removed columns are dropped, renamed columns take their published names,
//! and computed columns are appended.
//!
//! Projection is total. Computed columns whose sources are missing or not
//! scalar come out as empty strings; projection never fails and never
//! reorders or drops rows.

mod profiles;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::ResourceName;

pub use crate::store::Row;
pub use profiles::standard_profiles;

/// Published API versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
}

impl ApiVersion {
    /// Resolve a path segment such as `v1`
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "v1" => Some(ApiVersion::V1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URLs used by computed link columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Public site, used for record pages
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,

    /// Media host, used for photos and map images
    #[serde(default = "default_media_base_url")]
    pub media_base_url: String,

    /// Where activation links point
    #[serde(default = "default_activation_base_url")]
    pub activation_base_url: String,
}

fn default_site_base_url() -> String {
    "https://joshuaproject.net".to_string()
}

fn default_media_base_url() -> String {
    "https://joshuaproject.net/assets/media".to_string()
}

fn default_activation_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            site_base_url: default_site_base_url(),
            media_base_url: default_media_base_url(),
            activation_base_url: default_activation_base_url(),
        }
    }
}

/// Pure function computing a published column from a projected row
pub type ComputeFn = fn(&Row, &LinkConfig) -> String;

/// A column added during projection
#[derive(Clone, Copy)]
pub struct ComputedField {
    pub name: &'static str,
    pub compute: ComputeFn,
}

impl fmt::Debug for ComputedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedField")
            .field("name", &self.name)
            .finish()
    }
}

/// Version-specific projection rules for one resource
#[derive(Debug, Clone, Default)]
pub struct CompatProfile {
    pub removed: &'static [&'static str],
    /// (stored name, published name)
    pub renamed: &'static [(&'static str, &'static str)],
    pub computed: Vec<ComputedField>,
}

impl CompatProfile {
    fn apply(&self, mut row: Row, links: &LinkConfig) -> Row {
        for name in self.removed {
            row.remove(*name);
        }
        for (from, to) in self.renamed {
            if let Some(value) = row.remove(*from) {
                row.insert((*to).to_string(), value);
            }
        }
        for field in &self.computed {
            let value = (field.compute)(&row, links);
            row.insert(field.name.to_string(), Value::String(value));
        }
        row
    }
}

/// Projection rules for every (resource, version) pair
#[derive(Debug, Clone)]
pub struct FieldCompatibility {
    links: LinkConfig,
    profiles: HashMap<(ResourceName, ApiVersion), CompatProfile>,
}

impl FieldCompatibility {
    /// No profiles; rows pass through untouched
    pub fn new(links: LinkConfig) -> Self {
        Self {
            links,
            profiles: HashMap::new(),
        }
    }

    /// Profiles published by the API
    pub fn standard(links: LinkConfig) -> Self {
        let mut compat = Self::new(links);
        for (resource, version, profile) in standard_profiles() {
            compat = compat.with_profile(resource, version, profile);
        }
        compat
    }

    pub fn with_profile(
        mut self,
        resource: ResourceName,
        version: ApiVersion,
        profile: CompatProfile,
    ) -> Self {
        self.profiles.insert((resource, version), profile);
        self
    }

    pub fn links(&self) -> &LinkConfig {
        &self.links
    }

    /// Project rows for `resource` under `version`
    pub fn project(&self, rows: Vec<Row>, resource: ResourceName, version: ApiVersion) -> Vec<Row> {
        match self.profiles.get(&(resource, version)) {
            Some(profile) => rows
                .into_iter()
                .map(|row| profile.apply(row, &self.links))
                .collect(),
            None => rows,
        }
    }
}

/// Scalar column rendered as text; `None` when missing, null or structured
pub fn scalar_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar column as a number, parsing numeric text
pub fn scalar_number(row: &Row, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    fn shout(row: &Row, _: &LinkConfig) -> String {
        scalar_text(row, "Name").unwrap_or_default().to_uppercase()
    }

    fn sample() -> FieldCompatibility {
        FieldCompatibility::new(LinkConfig::default()).with_profile(
            ResourceName::Regions,
            ApiVersion::V1,
            CompatProfile {
                removed: &["X"],
                renamed: &[("RegionName", "Name")],
                computed: vec![ComputedField {
                    name: "LoudName",
                    compute: shout,
                }],
            },
        )
    }

    #[test]
    fn test_removed_field_absent_whether_or_not_present() {
        let compat = sample();
        let rows = vec![
            row(json!({"X": 1, "RegionName": "Asia"})),
            row(json!({"RegionName": "Europe"})),
        ];
        let projected = compat.project(rows, ResourceName::Regions, ApiVersion::V1);
        assert_eq!(projected.len(), 2);
        for r in &projected {
            assert!(!r.contains_key("X"));
        }
    }

    #[test]
    fn test_rename_happens_before_compute() {
        let compat = sample();
        let projected = compat.project(
            vec![row(json!({"RegionName": "Asia"}))],
            ResourceName::Regions,
            ApiVersion::V1,
        );
        assert_eq!(projected[0]["Name"], json!("Asia"));
        assert_eq!(projected[0]["LoudName"], json!("ASIA"));
        assert!(!projected[0].contains_key("RegionName"));
    }

    #[test]
    fn test_missing_source_yields_empty_string() {
        let compat = sample();
        let projected = compat.project(
            vec![row(json!({"Other": [1, 2]}))],
            ResourceName::Regions,
            ApiVersion::V1,
        );
        assert_eq!(projected[0]["LoudName"], json!(""));
    }

    #[test]
    fn test_order_preserved() {
        let compat = sample();
        let rows: Vec<Row> = (0..5)
            .map(|i| row(json!({"RegionName": format!("r{i}")})))
            .collect();
        let projected = compat.project(rows, ResourceName::Regions, ApiVersion::V1);
        let names: Vec<&Value> = projected.iter().map(|r| &r["Name"]).collect();
        assert_eq!(names, vec!["r0", "r1", "r2", "r3", "r4"]);
    }

    #[test]
    fn test_unprofiled_resource_passes_through() {
        let compat = sample();
        let original = row(json!({"X": 1}));
        let projected = compat.project(vec![original.clone()], ResourceName::Countries, ApiVersion::V1);
        assert_eq!(projected, vec![original]);
    }

    #[test]
    fn test_version_paths() {
        assert_eq!(ApiVersion::from_path("v1"), Some(ApiVersion::V1));
        assert_eq!(ApiVersion::from_path("v2"), None);
    }
}
