//! Geofence event history endpoint.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::TenantContext;
use domain::models::geofence_event::{ListGeofenceEventsQuery, ListGeofenceEventsResponse};

/// List ENTER/EXIT events of the caller's tenant, newest first.
///
/// GET /api/v1/geofence-events?actorId&geofenceId&limit
///
/// Students only see their own events: without `actorId` the filter defaults
/// to the caller, and any other actor is rejected.
pub async fn list_geofence_events(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(mut query): Query<ListGeofenceEventsQuery>,
) -> Result<Json<ListGeofenceEventsResponse>, ApiError> {
    if !ctx.role.is_staff() {
        let actor_id = query.actor_id.unwrap_or(ctx.actor_id);
        ctx.ensure_can_access(actor_id)?;
        query.actor_id = Some(actor_id);
    }

    let store = state.tracker.event_store();
    let events = store.list(ctx.tenant_id, &query).await?;
    let total = store.count(ctx.tenant_id, &query).await?;

    Ok(Json(ListGeofenceEventsResponse {
        events: events.into_iter().map(Into::into).collect(),
        total,
    }))
}
