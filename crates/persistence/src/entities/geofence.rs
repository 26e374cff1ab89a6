//! Geofence entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::geofence::{Geofence, GeofenceShape, GeofenceType};
use domain::GeofenceError;

/// Columns selected for a geofence; the polygon is read back as GeoJSON.
pub const GEOFENCE_COLUMNS: &str = r#"
    id, tenant_id, name, geofence_type, center_latitude, center_longitude,
    radius_meters, ST_AsGeoJSON(polygon)::jsonb AS polygon, active, metadata,
    created_at, updated_at
"#;

/// Database row mapping for the geofences table.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub geofence_type: String,
    pub center_latitude: Option<f64>,
    pub center_longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub polygon: Option<serde_json::Value>,
    pub active: bool,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GeofenceEntity> for Geofence {
    type Error = GeofenceError;

    fn try_from(entity: GeofenceEntity) -> Result<Self, Self::Error> {
        let geofence_type = GeofenceType::parse(&entity.geofence_type).ok_or_else(|| {
            GeofenceError::InvalidGeofence(format!(
                "unknown geofence type {}",
                entity.geofence_type
            ))
        })?;
        let shape = GeofenceShape::from_parts(
            entity.center_latitude,
            entity.center_longitude,
            entity.radius_meters,
            entity.polygon,
        )?;

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name,
            geofence_type,
            shape,
            active: entity.active,
            metadata: entity.metadata,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
