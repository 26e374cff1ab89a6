//! Location history retention.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::error::GeofenceResult;
use crate::services::store::LocationStore;

/// Days a location report is kept.
pub const LOCATION_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_days: LOCATION_RETENTION_DAYS,
        }
    }
}

impl RetentionPolicy {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// Reports recorded before this instant are expired.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.retention_days))
    }
}

/// Deletes expired location reports.
#[derive(Clone)]
pub struct RetentionSweeper {
    locations: Arc<dyn LocationStore>,
    policy: RetentionPolicy,
}

impl RetentionSweeper {
    pub fn new(locations: Arc<dyn LocationStore>, policy: RetentionPolicy) -> Self {
        Self { locations, policy }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Purges expired reports of one tenant, or of all tenants when
    /// `tenant_id` is `None`. Running it again without new data deletes
    /// nothing.
    pub async fn purge(&self, tenant_id: Option<Uuid>) -> GeofenceResult<u64> {
        let cutoff = self.policy.cutoff(Utc::now());
        let deleted = self
            .locations
            .delete_recorded_before(tenant_id, cutoff)
            .await?;

        counter!("location_reports_purged_total").increment(deleted);
        info!(
            tenant_id = ?tenant_id,
            cutoff = %cutoff,
            deleted = deleted,
            "Purged expired location reports"
        );

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::location::{Coordinate, NewLocationReport};
    use crate::services::memory::InMemoryStore;

    fn report_aged(tenant: Uuid, days: i64) -> crate::models::location::LocationReport {
        let mut new = NewLocationReport::at(Coordinate::new_unchecked(24.7136, 46.6753));
        new.recorded_at = Utc::now() - Duration::days(days);
        new.into_report(tenant, Uuid::new_v4())
    }

    #[test]
    fn test_default_policy_is_thirty_days() {
        let now = Utc::now();
        assert_eq!(RetentionPolicy::default().cutoff(now), now - Duration::days(30));
    }

    #[tokio::test]
    async fn test_purge_deletes_only_expired_reports() {
        let store = Arc::new(InMemoryStore::new());
        let tenant = Uuid::new_v4();
        let old = report_aged(tenant, 31);
        let recent = report_aged(tenant, 29);
        LocationStore::insert(store.as_ref(), &old).await.unwrap();
        LocationStore::insert(store.as_ref(), &recent).await.unwrap();

        let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::default());
        assert_eq!(sweeper.purge(Some(tenant)).await.unwrap(), 1);

        let remaining = store.location_ids().await;
        assert_eq!(remaining, vec![recent.id]);
    }

    #[tokio::test]
    async fn test_purge_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let tenant = Uuid::new_v4();
        LocationStore::insert(store.as_ref(), &report_aged(tenant, 40)).await.unwrap();

        let sweeper = RetentionSweeper::new(store, RetentionPolicy::default());
        assert_eq!(sweeper.purge(None).await.unwrap(), 1);
        assert_eq!(sweeper.purge(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scoped_purge_leaves_other_tenants() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        LocationStore::insert(store.as_ref(), &report_aged(tenant_a, 45)).await.unwrap();
        LocationStore::insert(store.as_ref(), &report_aged(tenant_b, 45)).await.unwrap();

        let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::default());
        assert_eq!(sweeper.purge(Some(tenant_a)).await.unwrap(), 1);
        assert_eq!(store.location_ids().await.len(), 1);
        assert_eq!(sweeper.purge(None).await.unwrap(), 1);
    }
}
