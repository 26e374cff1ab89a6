//! Entry points of the tracking core.
//!
//! Previous membership is derived on every submission by re-evaluating the
//! actor's latest stored report. Nothing is cached between calls, so any
//! number of instances can serve the same tenants.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::GeofenceResult;
use crate::models::location::NewLocationReport;
use crate::models::membership::MembershipResult;
use crate::services::attendance::AttendanceHook;
use crate::services::evaluator::{evaluate, inside_set};
use crate::services::recorder::EventRecorder;
use crate::services::retention::{RetentionPolicy, RetentionSweeper};
use crate::services::spatial::SpatialEngine;
use crate::services::store::{GeofenceEventStore, GeofenceStore, LocationStore};
use crate::services::transition::apply_transitions;

/// Result of a location submission.
#[derive(Debug, Clone)]
pub struct SubmitLocationOutcome {
    pub report_id: Uuid,
    /// Ids of the ENTER/EXIT events recorded, in geofence order.
    pub event_ids: Vec<Uuid>,
    pub memberships: Vec<MembershipResult>,
}

/// Tracks actor locations against tenant geofences.
#[derive(Clone)]
pub struct GeofenceTracker {
    geofences: Arc<dyn GeofenceStore>,
    locations: Arc<dyn LocationStore>,
    events: Arc<dyn GeofenceEventStore>,
    engine: Arc<dyn SpatialEngine>,
    recorder: EventRecorder,
    sweeper: RetentionSweeper,
}

impl GeofenceTracker {
    pub fn new(
        geofences: Arc<dyn GeofenceStore>,
        locations: Arc<dyn LocationStore>,
        events: Arc<dyn GeofenceEventStore>,
        engine: Arc<dyn SpatialEngine>,
        attendance: Arc<dyn AttendanceHook>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            recorder: EventRecorder::new(events.clone(), attendance),
            sweeper: RetentionSweeper::new(locations.clone(), retention),
            geofences,
            locations,
            events,
            engine,
        }
    }

    pub fn geofence_store(&self) -> &Arc<dyn GeofenceStore> {
        &self.geofences
    }

    pub fn event_store(&self) -> &Arc<dyn GeofenceEventStore> {
        &self.events
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.sweeper.policy()
    }

    /// Stores a location report, detects geofence transitions against the
    /// actor's previous report and records ENTER/EXIT events.
    pub async fn submit_location(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        report: NewLocationReport,
    ) -> GeofenceResult<SubmitLocationOutcome> {
        report.coordinate.validate()?;

        let geofences = self.geofences.find_active(tenant_id).await?;

        let previously_inside = match self.locations.find_latest(tenant_id, actor_id).await? {
            Some(previous) => {
                let results = evaluate(
                    tenant_id,
                    actor_id,
                    previous.coordinate,
                    &geofences,
                    self.engine.as_ref(),
                )
                .await;
                inside_set(&results)
            }
            None => Default::default(),
        };

        let report = report.into_report(tenant_id, actor_id);
        self.locations.insert(&report).await?;
        counter!("locations_submitted_total").increment(1);

        let mut memberships = evaluate(
            tenant_id,
            actor_id,
            report.coordinate,
            &geofences,
            self.engine.as_ref(),
        )
        .await;
        apply_transitions(&mut memberships, &previously_inside);

        let event_ids = self
            .recorder
            .record(
                tenant_id,
                actor_id,
                report.coordinate,
                report.recorded_at,
                &memberships,
            )
            .await
            .map_err(|e| {
                error!(
                    tenant_id = %tenant_id,
                    actor_id = %actor_id,
                    report_id = %report.id,
                    error = %e,
                    "Location report stored but geofence events were not recorded"
                );
                e
            })?;

        debug!(
            tenant_id = %tenant_id,
            actor_id = %actor_id,
            report_id = %report.id,
            geofences = geofences.len(),
            events = event_ids.len(),
            "Location submitted"
        );

        Ok(SubmitLocationOutcome {
            report_id: report.id,
            event_ids,
            memberships,
        })
    }

    /// Ids of the geofences containing the actor's latest report.
    pub async fn current_geofences(&self, tenant_id: Uuid, actor_id: Uuid) -> GeofenceResult<Vec<Uuid>> {
        let Some(latest) = self.locations.find_latest(tenant_id, actor_id).await? else {
            return Ok(Vec::new());
        };

        let geofences = self.geofences.find_active(tenant_id).await?;
        let results = evaluate(
            tenant_id,
            actor_id,
            latest.coordinate,
            &geofences,
            self.engine.as_ref(),
        )
        .await;

        Ok(results
            .into_iter()
            .filter(|r| r.inside)
            .map(|r| r.geofence_id)
            .collect())
    }

    /// Deletes expired location reports of one tenant, or of every tenant.
    pub async fn purge_old_locations(&self, tenant_id: Option<Uuid>) -> GeofenceResult<u64> {
        let deleted = self.sweeper.purge(tenant_id).await?;
        info!(tenant_id = ?tenant_id, deleted = deleted, "Location purge finished");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeofenceError;
    use crate::models::geofence::{Geofence, GeofenceShape, GeofenceType};
    use crate::models::geofence_event::{GeofenceEvent, GeofenceEventType};
    use crate::models::location::Coordinate;
    use crate::models::membership::Transition;
    use crate::services::attendance::MockAttendanceHook;
    use crate::services::memory::InMemoryStore;
    use crate::services::spatial::GeoSpatialEngine;
    use chrono::{DateTime, Duration, Utc};

    const CAMPUS: Coordinate = Coordinate::new_unchecked(24.7136, 46.6753);
    /// About 1.1 km north of campus.
    const OUTSIDE: Coordinate = Coordinate::new_unchecked(24.7236, 46.6753);

    struct Harness {
        store: Arc<InMemoryStore>,
        hook: Arc<MockAttendanceHook>,
        tracker: GeofenceTracker,
        tenant: Uuid,
        actor: Uuid,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let hook = Arc::new(MockAttendanceHook::new());
        let tracker = GeofenceTracker::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(GeoSpatialEngine::new()),
            hook.clone(),
            RetentionPolicy::default(),
        );
        Harness {
            store,
            hook,
            tracker,
            tenant: Uuid::new_v4(),
            actor: Uuid::new_v4(),
        }
    }

    async fn school_grounds(h: &Harness, tenant: Uuid) -> Geofence {
        let geofence = Geofence::new(
            tenant,
            "Main campus",
            GeofenceType::SchoolGrounds,
            GeofenceShape::Circular {
                center: CAMPUS,
                radius_meters: 500.0,
            },
        );
        h.store.create(&geofence).await.unwrap();
        geofence
    }

    async fn submit(h: &Harness, at: Coordinate) -> SubmitLocationOutcome {
        h.tracker
            .submit_location(h.tenant, h.actor, NewLocationReport::at(at))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_entry_into_school_grounds() {
        let h = harness();
        let geofence = school_grounds(&h, h.tenant).await;

        let outcome = submit(&h, CAMPUS).await;

        assert_eq!(outcome.event_ids.len(), 1);
        assert_eq!(outcome.memberships[0].transition, Transition::Enter);
        let event = h.store.event(outcome.event_ids[0]).await.unwrap();
        assert_eq!(event.event_type, GeofenceEventType::Enter);
        assert_eq!(event.geofence_id, geofence.id);
        assert!(event.processed_at.is_some());
        assert_eq!(h.hook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_staying_inside_records_nothing() {
        let h = harness();
        school_grounds(&h, h.tenant).await;

        submit(&h, CAMPUS).await;
        let outcome = submit(&h, CAMPUS).await;

        assert!(outcome.event_ids.is_empty());
        assert_eq!(outcome.memberships[0].transition, Transition::Inside);
        assert_eq!(h.hook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_leaving_records_exit_without_hook() {
        let h = harness();
        school_grounds(&h, h.tenant).await;

        submit(&h, CAMPUS).await;
        let outcome = submit(&h, OUTSIDE).await;

        assert_eq!(outcome.event_ids.len(), 1);
        let event = h.store.event(outcome.event_ids[0]).await.unwrap();
        assert_eq!(event.event_type, GeofenceEventType::Exit);
        assert!(event.processed_at.is_none());
        assert_eq!(h.hook.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_backdated_exit_still_allows_reentry() {
        let h = harness();
        school_grounds(&h, h.tenant).await;

        let entered = submit(&h, CAMPUS).await;
        let mut late = NewLocationReport::at(OUTSIDE);
        late.recorded_at = Utc::now() - Duration::minutes(5);
        let exited = h
            .tracker
            .submit_location(h.tenant, h.actor, late)
            .await
            .unwrap();
        let returned = submit(&h, CAMPUS).await;

        assert_eq!(entered.memberships[0].transition, Transition::Enter);
        assert_eq!(exited.memberships[0].transition, Transition::Exit);
        assert_eq!(returned.memberships[0].transition, Transition::Enter);
        assert_eq!(entered.event_ids.len(), 1);
        assert_eq!(exited.event_ids.len(), 1);
        assert_eq!(returned.event_ids.len(), 1);
        assert_eq!(h.hook.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_coordinate_is_rejected_before_storage() {
        let h = harness();
        let result = h
            .tracker
            .submit_location(
                h.tenant,
                h.actor,
                NewLocationReport::at(Coordinate::new_unchecked(91.0, 0.0)),
            )
            .await;

        assert!(matches!(result, Err(GeofenceError::InvalidCoordinate(_))));
        assert!(h.store.location_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_other_tenant_geofence_at_same_place_is_ignored() {
        let h = harness();
        school_grounds(&h, Uuid::new_v4()).await;

        let outcome = submit(&h, CAMPUS).await;

        assert!(outcome.memberships.is_empty());
        assert!(outcome.event_ids.is_empty());
        assert!(h
            .tracker
            .current_geofences(h.tenant, h.actor)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_current_geofences_uses_latest_report() {
        let h = harness();
        let geofence = school_grounds(&h, h.tenant).await;

        assert!(h
            .tracker
            .current_geofences(h.tenant, h.actor)
            .await
            .unwrap()
            .is_empty());

        submit(&h, CAMPUS).await;
        assert_eq!(
            h.tracker.current_geofences(h.tenant, h.actor).await.unwrap(),
            vec![geofence.id]
        );

        submit(&h, OUTSIDE).await;
        assert!(h
            .tracker
            .current_geofences(h.tenant, h.actor)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_purge_old_locations() {
        let h = harness();
        for days in [31, 29] {
            let mut report = NewLocationReport::at(CAMPUS);
            report.recorded_at = Utc::now() - Duration::days(days);
            h.tracker
                .submit_location(h.tenant, h.actor, report)
                .await
                .unwrap();
        }

        assert_eq!(h.tracker.purge_old_locations(Some(h.tenant)).await.unwrap(), 1);
        assert_eq!(h.tracker.purge_old_locations(Some(h.tenant)).await.unwrap(), 0);
        assert_eq!(h.store.location_ids().await.len(), 1);
    }

    struct FailingEvents;

    #[async_trait::async_trait]
    impl GeofenceEventStore for FailingEvents {
        async fn insert(&self, _event: &GeofenceEvent) -> GeofenceResult<()> {
            Err(GeofenceError::persistence("connection reset"))
        }

        async fn mark_processed(&self, _: Uuid, _: Uuid, _: DateTime<Utc>) -> GeofenceResult<()> {
            Ok(())
        }

        async fn list(
            &self,
            _: Uuid,
            _: &crate::models::geofence_event::ListGeofenceEventsQuery,
        ) -> GeofenceResult<Vec<GeofenceEvent>> {
            Ok(Vec::new())
        }

        async fn count(
            &self,
            _: Uuid,
            _: &crate::models::geofence_event::ListGeofenceEventsQuery,
        ) -> GeofenceResult<i64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_event_store_failure_surfaces_as_single_error() {
        let store = Arc::new(InMemoryStore::new());
        let tracker = GeofenceTracker::new(
            store.clone(),
            store.clone(),
            Arc::new(FailingEvents),
            Arc::new(GeoSpatialEngine::new()),
            Arc::new(MockAttendanceHook::new()),
            RetentionPolicy::default(),
        );
        let tenant = Uuid::new_v4();
        store
            .create(&Geofence::new(
                tenant,
                "Gate",
                GeofenceType::Custom,
                GeofenceShape::Circular {
                    center: CAMPUS,
                    radius_meters: 50.0,
                },
            ))
            .await
            .unwrap();

        let result = tracker
            .submit_location(tenant, Uuid::new_v4(), NewLocationReport::at(CAMPUS))
            .await;

        assert!(matches!(result, Err(GeofenceError::Persistence(_))));
        // The report itself is already durable.
        assert_eq!(store.location_ids().await.len(), 1);
    }
}
