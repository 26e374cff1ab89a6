//! Location report entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::location::{Coordinate, DeviceMetadata, LocationReport};

/// Database row mapping for the location_reports table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationReportEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub battery_level: Option<i32>,
    pub device_id: Option<String>,
    pub platform: Option<String>,
    pub app_version: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<LocationReportEntity> for LocationReport {
    fn from(entity: LocationReportEntity) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            actor_id: entity.actor_id,
            // Range-checked by the table constraints.
            coordinate: Coordinate::new_unchecked(entity.latitude, entity.longitude),
            accuracy: entity.accuracy,
            altitude: entity.altitude,
            heading: entity.heading,
            speed: entity.speed,
            battery_level: entity.battery_level,
            device: DeviceMetadata {
                device_id: entity.device_id,
                platform: entity.platform,
                app_version: entity.app_version,
            },
            recorded_at: entity.recorded_at,
            created_at: entity.created_at,
        }
    }
}
