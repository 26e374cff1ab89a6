//! Geofence administration endpoints.
//!
//! Any member of a tenant can read its geofences; only admins change them.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::TenantContext;
use domain::models::geofence::{
    CreateGeofenceRequest, Geofence, GeofenceResponse, ListGeofencesQuery, ListGeofencesResponse,
    UpdateGeofenceRequest,
};

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Geofence {} not found", id))
}

/// POST /api/v1/geofences
pub async fn create_geofence(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(request): Json<CreateGeofenceRequest>,
) -> Result<(StatusCode, Json<GeofenceResponse>), ApiError> {
    ctx.require_admin()?;
    request.validate()?;

    let mut geofence = Geofence::new(
        ctx.tenant_id,
        request.name.trim(),
        request.geofence_type,
        request.shape()?,
    );
    geofence.active = request.active;
    geofence.metadata = request.metadata;

    state.tracker.geofence_store().create(&geofence).await?;

    info!(
        tenant_id = %ctx.tenant_id,
        geofence_id = %geofence.id,
        geofence_type = %geofence.geofence_type,
        "Geofence created"
    );

    Ok((StatusCode::CREATED, Json(geofence.into())))
}

/// GET /api/v1/geofences
pub async fn list_geofences(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListGeofencesQuery>,
) -> Result<Json<ListGeofencesResponse>, ApiError> {
    let geofences: Vec<GeofenceResponse> = state
        .tracker
        .geofence_store()
        .list(ctx.tenant_id, query.include_inactive)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListGeofencesResponse {
        total: geofences.len(),
        geofences,
    }))
}

/// GET /api/v1/geofences/:geofence_id
pub async fn get_geofence(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(geofence_id): Path<Uuid>,
) -> Result<Json<GeofenceResponse>, ApiError> {
    let geofence = state
        .tracker
        .geofence_store()
        .find_by_id(ctx.tenant_id, geofence_id)
        .await?
        .ok_or_else(|| not_found(geofence_id))?;

    Ok(Json(geofence.into()))
}

/// PATCH /api/v1/geofences/:geofence_id
pub async fn update_geofence(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(geofence_id): Path<Uuid>,
    Json(request): Json<UpdateGeofenceRequest>,
) -> Result<Json<GeofenceResponse>, ApiError> {
    ctx.require_admin()?;
    request.validate()?;

    let store = state.tracker.geofence_store();
    let mut geofence = store
        .find_by_id(ctx.tenant_id, geofence_id)
        .await?
        .ok_or_else(|| not_found(geofence_id))?;

    request.apply(&mut geofence)?;

    if !store.update(&geofence).await? {
        return Err(not_found(geofence_id));
    }

    info!(
        tenant_id = %ctx.tenant_id,
        geofence_id = %geofence_id,
        active = geofence.active,
        "Geofence updated"
    );

    Ok(Json(geofence.into()))
}

/// DELETE /api/v1/geofences/:geofence_id
///
/// Removes the geofence together with its event history.
pub async fn delete_geofence(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(geofence_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require_admin()?;

    let deleted = state
        .tracker
        .geofence_store()
        .delete(ctx.tenant_id, geofence_id)
        .await?;
    if !deleted {
        return Err(not_found(geofence_id));
    }

    info!(tenant_id = %ctx.tenant_id, geofence_id = %geofence_id, "Geofence deleted");
    Ok(StatusCode::NO_CONTENT)
}
