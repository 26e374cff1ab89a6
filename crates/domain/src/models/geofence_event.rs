//! Geofence event domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::Coordinate;

/// Persisted geofence transition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeofenceEventType {
    Enter,
    Exit,
}

impl GeofenceEventType {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "ENTER",
            Self::Exit => "EXIT",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ENTER" => Some(Self::Enter),
            "EXIT" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeofenceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model for a recorded ENTER/EXIT transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub geofence_id: Uuid,
    /// Joined from the geofence on reads; not stored on the event row.
    pub geofence_name: Option<String>,
    pub event_type: GeofenceEventType,
    pub coordinate: Coordinate,
    pub occurred_at: DateTime<Utc>,
    /// Set once downstream side effects (auto-attendance) have run.
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl GeofenceEvent {
    /// Creates an unprocessed event with a fresh id.
    pub fn new(
        tenant_id: Uuid,
        actor_id: Uuid,
        geofence_id: Uuid,
        event_type: GeofenceEventType,
        coordinate: Coordinate,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            actor_id,
            geofence_id,
            geofence_name: None,
            event_type,
            coordinate,
            occurred_at,
            processed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Query parameters for listing geofence events.
/// GET /api/v1/geofence-events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsQuery {
    pub actor_id: Option<Uuid>,
    pub geofence_id: Option<Uuid>,
    pub limit: Option<i64>,
}

impl ListGeofenceEventsQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Returns the effective limit, clamped to valid range.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Response for a single geofence event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEventResponse {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub geofence_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence_name: Option<String>,
    pub event_type: GeofenceEventType,
    pub latitude: f64,
    pub longitude: f64,
    pub occurred_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<GeofenceEvent> for GeofenceEventResponse {
    fn from(event: GeofenceEvent) -> Self {
        Self {
            id: event.id,
            actor_id: event.actor_id,
            geofence_id: event.geofence_id,
            geofence_name: event.geofence_name,
            event_type: event.event_type,
            latitude: event.coordinate.latitude,
            longitude: event.coordinate.longitude,
            occurred_at: event.occurred_at,
            processed_at: event.processed_at,
        }
    }
}

/// Response for listing geofence events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsResponse {
    pub events: Vec<GeofenceEventResponse>,
    pub total: i64,
}
