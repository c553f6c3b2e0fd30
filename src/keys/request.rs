//! # Key Requests
//!
//! The form a person submits to obtain an API key, with its flat and
//! cross-field validation.

use serde::{Deserialize, Serialize};

use crate::validation::sanitizer::{clean_all, SET_DELIMITER};
use crate::validation::validator::{self, ParamSource};
use crate::validation::ValidationResult;

/// Usage categories a requester may choose
pub const USAGE_CATEGORIES: &[&str] = &["website", "mobile", "research", "ministry", "other"];

/// Fields every request must carry
const ALWAYS_REQUIRED: &[&str] = &["name", "email", "usage"];

/// Usage categories that need a companion field
const COMPANIONS: &[(&str, &str)] = &[("website", "website_url"), ("other", "other_purpose")];

/// Submitted key request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// One or more of [`USAGE_CATEGORIES`]
    #[serde(default)]
    pub usage: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_purpose: Option<String>,
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl ParamSource for KeyRequest {
    fn is_present(&self, name: &str) -> bool {
        match name {
            "name" => present(Some(self.name.as_str())),
            "email" => present(Some(self.email.as_str())),
            "usage" => self.usage.iter().any(|u| !u.trim().is_empty()),
            "website_url" => present(self.website_url.as_deref()),
            "other_purpose" => present(self.other_purpose.as_deref()),
            _ => false,
        }
    }
}

impl KeyRequest {
    /// Usage tokens after sanitizing, blanks dropped
    pub fn usage_tokens(&self) -> Vec<String> {
        clean_all(&self.usage)
            .into_iter()
            .filter(|u| !u.is_empty())
            .collect()
    }

    /// Required names for this request, companions included
    pub fn required_fields(&self) -> Vec<&'static str> {
        let usage = self.usage_tokens();
        let mut required = ALWAYS_REQUIRED.to_vec();
        for (category, companion) in COMPANIONS {
            if usage.iter().any(|u| u == category) {
                required.push(*companion);
            }
        }
        required
    }

    /// Check required fields, usage categories and email shape
    ///
    /// Missing fields are all reported together; later checks fail fast.
    pub fn validate(&self) -> ValidationResult<()> {
        validator::require_all_present(self, &self.required_fields())?;

        let usage = self.usage_tokens().join(&SET_DELIMITER.to_string());
        validator::enum_membership(&usage, USAGE_CATEGORIES)?;

        validator::email_address(&self.email)
    }

    /// Human-readable usage stored with the key
    pub fn usage_description(&self) -> String {
        let mut description = self.usage_tokens().join(", ");
        if let Some(url) = self.website_url.as_deref().filter(|v| !v.trim().is_empty()) {
            description.push_str(&format!("; website: {}", url.trim()));
        }
        if let Some(purpose) = self.other_purpose.as_deref().filter(|v| !v.trim().is_empty()) {
            description.push_str(&format!("; other: {}", purpose.trim()));
        }
        description
    }
}
