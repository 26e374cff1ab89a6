//! Geofence event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::geofence_event::{GeofenceEvent, GeofenceEventType};
use domain::models::location::Coordinate;
use domain::GeofenceError;

/// Database row mapping for the geofence_events table, with the geofence
/// name joined in.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventEntity {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub geofence_id: Uuid,
    pub geofence_name: Option<String>,
    pub event_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub occurred_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GeofenceEventEntity> for GeofenceEvent {
    type Error = GeofenceError;

    fn try_from(entity: GeofenceEventEntity) -> Result<Self, Self::Error> {
        let event_type = GeofenceEventType::parse(&entity.event_type).ok_or_else(|| {
            GeofenceError::Persistence(format!("unknown event type {}", entity.event_type))
        })?;

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            actor_id: entity.actor_id,
            geofence_id: entity.geofence_id,
            geofence_name: entity.geofence_name,
            event_type,
            coordinate: Coordinate::new_unchecked(entity.latitude, entity.longitude),
            occurred_at: entity.occurred_at,
            processed_at: entity.processed_at,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> GeofenceEventEntity {
        GeofenceEventEntity {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            geofence_id: Uuid::new_v4(),
            geofence_name: Some("Main campus".to_string()),
            event_type: "ENTER".to_string(),
            latitude: 24.7136,
            longitude: 46.6753,
            occurred_at: Utc::now(),
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_entity_to_domain() {
        let entity = create_test_entity();
        let event = GeofenceEvent::try_from(entity.clone()).unwrap();

        assert_eq!(event.id, entity.id);
        assert_eq!(event.event_type, GeofenceEventType::Enter);
        assert_eq!(event.geofence_name.as_deref(), Some("Main campus"));
        assert!(event.processed_at.is_none());
    }

    #[test]
    fn test_event_entity_with_unknown_type() {
        let mut entity = create_test_entity();
        entity.event_type = "DWELL".to_string();
        assert!(GeofenceEvent::try_from(entity).is_err());
    }
}
