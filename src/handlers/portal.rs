use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::config;
use crate::error::ApiError;
use crate::navigation;
use crate::permissions::{gate, Capability};
use crate::routing;

fn require_tenant(tenant: &str) -> Result<&str, ApiError> {
    let tenant = tenant.trim();
    if tenant.is_empty() {
        return Err(ApiError::bad_request("tenant id must not be empty"));
    }
    Ok(tenant)
}

/// GET /portal/:tenant/state - current sync state snapshot
pub async fn state_get(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = require_tenant(&tenant)?;
    let handle = state.registry.handle(tenant).await;

    Ok(Json(json!({
        "success": true,
        "data": handle.snapshot()
    })))
}

/// GET /portal/:tenant/navigation - catalog projected for the tenant
pub async fn navigation_get(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = require_tenant(&tenant)?;
    let handle = state.registry.handle(tenant).await;
    let snapshot = handle.snapshot();

    let entries = navigation::project(navigation::CATALOG, snapshot.permissions.as_ref());
    let empty = entries.is_empty();

    // An empty projection is a state the frontend must render explicitly,
    // never an ambiguous blank panel.
    Ok(Json(json!({
        "success": true,
        "data": {
            "tenant": snapshot.tenant,
            "isLoading": snapshot.is_loading,
            "entries": entries,
            "empty": empty
        }
    })))
}

/// GET /portal/:tenant/access/:capability - page-level gate decision
pub async fn access_get(
    State(state): State<AppState>,
    Path((tenant, capability)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = require_tenant(&tenant)?;
    let capability: Capability = capability.parse()?;

    let handle = state.registry.handle(tenant).await;
    let snapshot = handle.snapshot();
    let decision = gate::page_state(snapshot.permissions.as_ref(), snapshot.is_loading, capability);

    let guidance = match decision {
        gate::AccessDecision::Restricted => Some(
            "This area is not enabled for your organization. Contact your tenant administrator.",
        ),
        _ => None,
    };

    Ok(Json(json!({
        "success": true,
        "data": {
            "capability": capability,
            "decision": decision,
            "guidance": guidance
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

/// GET /portal/:tenant/resolve?path=... - logical route resolution
pub async fn resolve_get(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Query(query): Query<ResolveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = require_tenant(&tenant)?;
    let resolved = routing::resolve(&query.path);

    let handle = state.registry.handle(tenant).await;
    let snapshot = handle.snapshot();
    let required = resolved.page.required_capability();
    let allowed = gate::is_allowed(snapshot.permissions.as_ref(), required);

    // Bare (legacy) paths carry no tenant segment; the configured default
    // tenant is the effective context for them.
    let effective_tenant = resolved
        .tenant_id
        .clone()
        .or_else(|| config::config().portal.default_tenant.clone());

    Ok(Json(json!({
        "success": true,
        "data": {
            "page": resolved.page,
            "pathTenant": resolved.tenant_id,
            "effectiveTenant": effective_tenant,
            "requiredCapability": required,
            "allowed": allowed
        }
    })))
}

/// POST /portal/:tenant/refresh - immediate in-place refetch
pub async fn refresh_post(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = require_tenant(&tenant)?;

    // A halted synchronizer cannot be poked back to life; a refresh after
    // a tenant-missing streak is a full reactivation instead.
    let handle = state.registry.handle(tenant).await;
    if handle.is_halted() {
        state.registry.reactivate(tenant).await;
    } else {
        handle.refresh();
    }

    Ok(Json(json!({
        "success": true,
        "data": { "refreshed": true }
    })))
}
