//! Resource HTTP Routes
//!
//! Key-gated list and lookup endpoints under `/:version/`.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use tracing::debug;

use super::errors::{ApiError, ApiResult};
use super::format::{split_format, Format};
use super::state::ApiState;
use crate::access::require_api_key;
use crate::compat::ApiVersion;
use crate::filter::{compile, compile_lookup, CompiledQuery, ResourceName, ResourceSpec};

/// Path segment under `people_groups/` for the daily unreached list
pub const DAILY_UNREACHED_SEGMENT: &str = "daily_unreached";

/// Resource routes, all behind the API key gate
pub fn resource_routes(state: ApiState) -> Router {
    let gate = state.gate.clone();
    Router::new()
        .route("/:version/:resource", get(list_handler))
        .route("/:version/:resource/:id", get(show_handler))
        .route_layer(middleware::from_fn_with_state(gate, require_api_key))
        .with_state(state)
}

fn resolve_version(segment: &str) -> ApiResult<ApiVersion> {
    ApiVersion::from_path(segment)
        .ok_or_else(|| ApiError::not_found(format!("Unknown API version: {}", segment)))
}

fn resolve_resource<'a>(state: &'a ApiState, segment: &str) -> ApiResult<&'a ResourceSpec> {
    ResourceName::from_path(segment)
        .and_then(|name| state.registry.resource(name))
        .ok_or_else(|| ApiError::not_found(format!("Unknown resource: {}", segment)))
}

fn split(segment: &str) -> ApiResult<(&str, Format)> {
    split_format(segment)
        .ok_or_else(|| ApiError::not_found(format!("Unknown format: {}", segment)))
}

fn run(
    state: &ApiState,
    query: &CompiledQuery,
    version: ApiVersion,
    format: Format,
) -> ApiResult<Response> {
    let rows = state.store.fetch(query)?;
    let rows = state.compat.project(rows, query.resource, version);
    debug!(resource = %query.resource, rows = rows.len(), "responding");
    Ok(format.formatter().respond(query.resource, &rows))
}

/// `GET /:version/:resource.:format`
async fn list_handler(
    State(state): State<ApiState>,
    Path((version, resource)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let version = resolve_version(&version)?;
    let (stem, format) = split(&resource)?;
    let spec = resolve_resource(&state, stem)?;

    let query = compile(spec, &params)?;
    run(&state, &query, version, format)
}

/// `GET /:version/:resource/:id.:format`
///
/// `people_groups/daily_unreached` is a list of its own rather than a lookup.
async fn show_handler(
    State(state): State<ApiState>,
    Path((version, resource, id)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let version = resolve_version(&version)?;
    let spec = resolve_resource(&state, &resource)?;
    let (id, format) = split(&id)?;

    if spec.name == ResourceName::PeopleGroups && id == DAILY_UNREACHED_SEGMENT {
        let daily = state
            .registry
            .resource(ResourceName::DailyUnreached)
            .ok_or_else(|| ApiError::not_found(DAILY_UNREACHED_SEGMENT))?;
        let query = compile(daily, &params)?;
        return run(&state, &query, version, format);
    }

    let query = compile_lookup(spec, id)?;
    let rows = state.store.fetch(&query)?;
    if rows.is_empty() {
        return Err(ApiError::not_found(format!(
            "No {} found with id {}",
            spec.name, id
        )));
    }
    let rows = state.compat.project(rows, spec.name, version);
    Ok(format.formatter().respond(spec.name, &rows))
}
