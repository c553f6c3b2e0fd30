//! peoplegroups-api - A key-gated public data API
//!
//! Serves countries, people groups, languages, regions and continents
//! filtered by client query parameters. Every parameter is validated
//! against a per-resource registry and compiled into a parameterized query;
//! client text only ever reaches storage as a bound value.

pub mod access;
pub mod cli;
pub mod compat;
pub mod config;
pub mod filter;
pub mod http_server;
pub mod keys;
pub mod store;
pub mod validation;
