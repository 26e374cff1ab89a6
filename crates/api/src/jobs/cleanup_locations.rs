//! Location retention background job.

use std::sync::Arc;

use domain::services::GeofenceTracker;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Deletes location reports older than the retention window, across all tenants.
pub struct CleanupLocationsJob {
    tracker: Arc<GeofenceTracker>,
}

impl CleanupLocationsJob {
    pub fn new(tracker: Arc<GeofenceTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait::async_trait]
impl Job for CleanupLocationsJob {
    fn name(&self) -> &'static str {
        "cleanup_locations"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self
            .tracker
            .purge_old_locations(None)
            .await
            .map_err(|e| format!("Failed to purge location reports: {}", e))?;

        info!(
            deleted = deleted,
            retention_days = self.tracker.retention().retention_days,
            "Expired location reports removed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::models::{Coordinate, NewLocationReport};
    use domain::services::{
        GeoSpatialEngine, InMemoryStore, LocationStore, MockAttendanceHook, RetentionPolicy,
    };
    use uuid::Uuid;

    fn tracker(store: &Arc<InMemoryStore>) -> Arc<GeofenceTracker> {
        Arc::new(GeofenceTracker::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(GeoSpatialEngine::new()),
            Arc::new(MockAttendanceHook::new()),
            RetentionPolicy::default(),
        ))
    }

    async fn report_aged(store: &InMemoryStore, tenant_id: Uuid, days: i64) -> Uuid {
        let mut input = NewLocationReport::at(Coordinate::new_unchecked(24.7136, 46.6753));
        input.recorded_at = Utc::now() - Duration::days(days);
        let report = input.into_report(tenant_id, Uuid::new_v4());
        let id = report.id;
        LocationStore::insert(store, &report).await.unwrap();
        id
    }

    #[test]
    fn test_runs_daily() {
        let store = Arc::new(InMemoryStore::new());
        let job = CleanupLocationsJob::new(tracker(&store));
        assert_eq!(job.name(), "cleanup_locations");
        assert_eq!(job.frequency(), JobFrequency::Daily);
    }

    #[tokio::test]
    async fn test_purges_expired_reports_of_every_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let expired_a = report_aged(&store, Uuid::new_v4(), 31).await;
        let expired_b = report_aged(&store, Uuid::new_v4(), 45).await;
        let fresh = report_aged(&store, Uuid::new_v4(), 29).await;

        let job = CleanupLocationsJob::new(tracker(&store));
        tokio_test::assert_ok!(job.execute().await);

        let remaining = store.location_ids().await;
        assert_eq!(remaining, vec![fresh]);
        assert!(!remaining.contains(&expired_a));
        assert!(!remaining.contains(&expired_b));

        // A second run finds nothing to delete.
        job.execute().await.unwrap();
        assert_eq!(store.location_ids().await, vec![fresh]);
    }
}
