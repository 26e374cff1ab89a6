//! Persists ENTER/EXIT transitions and runs the auto-attendance side effect.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::GeofenceResult;
use crate::models::geofence_event::{GeofenceEvent, GeofenceEventType};
use crate::models::location::Coordinate;
use crate::models::membership::MembershipResult;
use crate::services::attendance::{AttendanceHook, SchoolEntry};
use crate::services::store::GeofenceEventStore;

/// Records geofence events for evaluated memberships.
#[derive(Clone)]
pub struct EventRecorder {
    events: Arc<dyn GeofenceEventStore>,
    attendance: Arc<dyn AttendanceHook>,
}

impl EventRecorder {
    pub fn new(events: Arc<dyn GeofenceEventStore>, attendance: Arc<dyn AttendanceHook>) -> Self {
        Self { events, attendance }
    }

    /// Persists one event per ENTER or EXIT result and returns their ids in
    /// result order.
    ///
    /// An ENTER into school grounds also invokes the attendance hook and, on
    /// success, marks the event processed. Hook and mark failures are logged
    /// and never affect the other events. Insert failures are returned.
    pub async fn record(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        location: Coordinate,
        occurred_at: DateTime<Utc>,
        results: &[MembershipResult],
    ) -> GeofenceResult<Vec<Uuid>> {
        let mut event_ids = Vec::new();

        for result in results {
            let Some(event_type) = result.transition.event_type() else {
                continue;
            };

            let mut event = GeofenceEvent::new(
                tenant_id,
                actor_id,
                result.geofence_id,
                event_type,
                location,
                occurred_at,
            );
            event.geofence_name = Some(result.geofence_name.clone());

            self.events.insert(&event).await?;
            counter!("geofence_events_recorded_total", "event_type" => event_type.as_str())
                .increment(1);
            debug!(
                event_id = %event.id,
                geofence_id = %result.geofence_id,
                event_type = %event_type,
                "Recorded geofence event"
            );

            if event_type == GeofenceEventType::Enter && result.geofence_type.is_school_grounds() {
                self.run_attendance(&event).await;
            }

            event_ids.push(event.id);
        }

        Ok(event_ids)
    }

    async fn run_attendance(&self, event: &GeofenceEvent) {
        let entry = SchoolEntry {
            tenant_id: event.tenant_id,
            actor_id: event.actor_id,
            geofence_id: event.geofence_id,
            event_id: event.id,
            occurred_at: event.occurred_at,
        };

        if let Err(e) = self.attendance.on_school_entry(&entry).await {
            warn!(
                tenant_id = %event.tenant_id,
                event_id = %event.id,
                error = %e,
                "Auto-attendance hook failed; event left unprocessed"
            );
            return;
        }

        if let Err(e) = self
            .events
            .mark_processed(event.tenant_id, event.id, Utc::now())
            .await
        {
            warn!(
                tenant_id = %event.tenant_id,
                event_id = %event.id,
                error = %e,
                "Failed to mark geofence event processed"
            );
        }
    }
}
