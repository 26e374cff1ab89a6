//! Per-evaluation geofence membership results.

use serde::Serialize;
use uuid::Uuid;

use crate::models::geofence::GeofenceType;
use crate::models::geofence_event::GeofenceEventType;

/// Classification of a membership change between two consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transition {
    Enter,
    Exit,
    Inside,
    None,
}

impl Transition {
    /// The event to persist for this transition, if any.
    pub fn event_type(&self) -> Option<GeofenceEventType> {
        match self {
            Transition::Enter => Some(GeofenceEventType::Enter),
            Transition::Exit => Some(GeofenceEventType::Exit),
            Transition::Inside | Transition::None => None,
        }
    }
}

/// Membership of one location in one geofence. Not persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResult {
    pub geofence_id: Uuid,
    pub geofence_name: String,
    pub geofence_type: GeofenceType,
    pub inside: bool,
    /// Meters to the geofence; `f64::INFINITY` when undetermined.
    pub distance_meters: f64,
    pub transition: Transition,
}

impl MembershipResult {
    /// Whether the spatial check could not be completed.
    pub fn is_undetermined(&self) -> bool {
        self.distance_meters.is_infinite()
    }
}
