//! Administrative maintenance endpoints.

use axum::{extract::State, Json};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::TenantContext;
use domain::models::location::PurgeLocationsResponse;

/// Delete location reports past the retention window.
///
/// POST /api/v1/admin/locations/purge
///
/// Always scoped to the caller's tenant. The unscoped sweep only runs from
/// the scheduled cleanup job.
pub async fn purge_locations(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<PurgeLocationsResponse>, ApiError> {
    ctx.require_admin()?;

    let deleted_count = state
        .tracker
        .purge_old_locations(Some(ctx.tenant_id))
        .await?;

    info!(
        tenant_id = %ctx.tenant_id,
        deleted_count = deleted_count,
        "Manual location purge"
    );

    Ok(Json(PurgeLocationsResponse { deleted_count }))
}
