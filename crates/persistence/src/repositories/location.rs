//! Location report repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use domain::models::location::LocationReport;
use domain::services::LocationStore;
use domain::{GeofenceError, GeofenceResult};

use crate::entities::LocationReportEntity;
use crate::metrics::QueryTimer;

/// Rows deleted per statement during retention purges.
pub const DEFAULT_PURGE_BATCH_SIZE: i64 = 10_000;

/// Repository for location report operations.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
    purge_batch_size: i64,
}

impl LocationRepository {
    /// Creates a new LocationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            purge_batch_size: DEFAULT_PURGE_BATCH_SIZE,
        }
    }

    /// Overrides the number of rows deleted per purge statement.
    pub fn with_purge_batch_size(mut self, batch_size: i64) -> Self {
        self.purge_batch_size = batch_size.max(1);
        self
    }

    /// Insert a location report.
    pub async fn insert(&self, report: &LocationReport) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_location_report");
        let result = sqlx::query(
            r#"
            INSERT INTO location_reports (id, tenant_id, actor_id, latitude, longitude, accuracy,
                                          altitude, heading, speed, battery_level, device_id,
                                          platform, app_version, recorded_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(report.id)
        .bind(report.tenant_id)
        .bind(report.actor_id)
        .bind(report.coordinate.latitude)
        .bind(report.coordinate.longitude)
        .bind(report.accuracy)
        .bind(report.altitude)
        .bind(report.heading)
        .bind(report.speed)
        .bind(report.battery_level)
        .bind(&report.device.device_id)
        .bind(&report.device.platform)
        .bind(&report.device.app_version)
        .bind(report.recorded_at)
        .bind(report.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Latest report of an actor by arrival time.
    pub async fn find_latest(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Option<LocationReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_location_report");
        let result = sqlx::query_as::<_, LocationReportEntity>(
            r#"
            SELECT id, tenant_id, actor_id, latitude, longitude, accuracy, altitude, heading,
                   speed, battery_level, device_id, platform, app_version, recorded_at, created_at
            FROM location_reports
            WHERE tenant_id = $1 AND actor_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete reports recorded before `cutoff` in batches to avoid long locks.
    ///
    /// Each batch commits on its own, so a failure part way leaves the
    /// completed batches deleted and the purge can simply be run again.
    pub async fn delete_recorded_before(
        &self,
        tenant_id: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let mut total_deleted: u64 = 0;

        loop {
            let timer = QueryTimer::new("delete_expired_location_reports");
            let result = sqlx::query(
                r#"
                WITH to_delete AS (
                    SELECT id FROM location_reports
                    WHERE recorded_at < $1
                      AND ($2::uuid IS NULL OR tenant_id = $2)
                    LIMIT $3
                )
                DELETE FROM location_reports
                WHERE id IN (SELECT id FROM to_delete)
                "#,
            )
            .bind(cutoff)
            .bind(tenant_id)
            .bind(self.purge_batch_size)
            .execute(&self.pool)
            .await;
            timer.record();

            let deleted = result?.rows_affected();
            total_deleted += deleted;
            debug!(batch = deleted, total = total_deleted, "Deleted location report batch");

            if deleted < self.purge_batch_size as u64 {
                break;
            }

            tokio::task::yield_now().await;
        }

        Ok(total_deleted)
    }
}

#[async_trait::async_trait]
impl LocationStore for LocationRepository {
    async fn insert(&self, report: &LocationReport) -> GeofenceResult<()> {
        LocationRepository::insert(self, report)
            .await
            .map_err(GeofenceError::persistence)
    }

    async fn find_latest(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> GeofenceResult<Option<LocationReport>> {
        LocationRepository::find_latest(self, tenant_id, actor_id)
            .await
            .map(|entity| entity.map(LocationReport::from))
            .map_err(GeofenceError::persistence)
    }

    async fn delete_recorded_before(
        &self,
        tenant_id: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> GeofenceResult<u64> {
        LocationRepository::delete_recorded_before(self, tenant_id, cutoff)
            .await
            .map_err(GeofenceError::persistence)
    }
}
