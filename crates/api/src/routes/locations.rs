//! Location endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::TenantContext;
use domain::models::location::{
    CurrentGeofencesResponse, SubmitLocationRequest, SubmitLocationResponse,
};

/// Submit a location for the calling actor.
///
/// POST /api/v1/locations
pub async fn submit_location(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(request): Json<SubmitLocationRequest>,
) -> Result<(StatusCode, Json<SubmitLocationResponse>), ApiError> {
    request.validate()?;
    let input = request.into_new_report()?;

    let outcome = state
        .tracker
        .submit_location(ctx.tenant_id, ctx.actor_id, input)
        .await?;

    info!(
        tenant_id = %ctx.tenant_id,
        actor_id = %ctx.actor_id,
        report_id = %outcome.report_id,
        events = outcome.event_ids.len(),
        "Location submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitLocationResponse {
            report_id: outcome.report_id,
            event_ids: outcome.event_ids,
        }),
    ))
}

/// Geofences currently containing an actor.
///
/// GET /api/v1/actors/:actor_id/geofences
pub async fn current_geofences(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(actor_id): Path<Uuid>,
) -> Result<Json<CurrentGeofencesResponse>, ApiError> {
    ctx.ensure_can_access(actor_id)?;

    let geofence_ids = state
        .tracker
        .current_geofences(ctx.tenant_id, actor_id)
        .await?;

    Ok(Json(CurrentGeofencesResponse {
        actor_id,
        geofence_ids,
    }))
}
