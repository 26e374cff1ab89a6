//! Geofence evaluation: membership of one location in a tenant's geofences.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::models::geofence::{Geofence, GeofenceShape};
use crate::models::location::Coordinate;
use crate::models::membership::{MembershipResult, Transition};
use crate::services::geo::{distance_meters, is_inside_circle};
use crate::services::spatial::{PolygonMembership, SpatialEngine};

/// Evaluates `location` against `geofences`.
///
/// Returns one result per evaluable geofence, in input order, all with
/// `Transition::None`. Geofences of other tenants, inactive geofences and
/// malformed shapes are skipped. A spatial engine failure marks only the
/// affected geofence as undetermined.
pub async fn evaluate(
    tenant_id: Uuid,
    actor_id: Uuid,
    location: Coordinate,
    geofences: &[Geofence],
    engine: &dyn SpatialEngine,
) -> Vec<MembershipResult> {
    let mut results = Vec::with_capacity(geofences.len());

    for geofence in geofences {
        if geofence.tenant_id != tenant_id {
            warn!(
                tenant_id = %tenant_id,
                geofence_id = %geofence.id,
                "Skipping geofence owned by another tenant"
            );
            continue;
        }

        if !geofence.active {
            continue;
        }

        if let Err(e) = geofence.shape.check() {
            warn!(
                tenant_id = %tenant_id,
                geofence_id = %geofence.id,
                error = %e,
                "Skipping malformed geofence"
            );
            continue;
        }

        let membership = match &geofence.shape {
            GeofenceShape::Circular {
                center,
                radius_meters,
            } => PolygonMembership {
                inside: is_inside_circle(location, *center, *radius_meters),
                distance_meters: distance_meters(location, *center),
            },
            GeofenceShape::Polygon { geometry } => {
                match engine.polygon_membership(location, geometry).await {
                    Ok(membership) => membership,
                    Err(e) => {
                        warn!(
                            tenant_id = %tenant_id,
                            actor_id = %actor_id,
                            geofence_id = %geofence.id,
                            error = %e,
                            "Polygon membership undetermined"
                        );
                        PolygonMembership::UNDETERMINED
                    }
                }
            }
        };

        results.push(MembershipResult {
            geofence_id: geofence.id,
            geofence_name: geofence.name.clone(),
            geofence_type: geofence.geofence_type,
            inside: membership.inside,
            distance_meters: membership.distance_meters,
            transition: Transition::None,
        });
    }

    results
}

/// Ids of the geofences the location is inside.
pub fn inside_set(results: &[MembershipResult]) -> HashSet<Uuid> {
    results
        .iter()
        .filter(|r| r.inside)
        .map(|r| r.geofence_id)
        .collect()
}
