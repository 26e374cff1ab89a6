//! Geofence event repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::geofence_event::{GeofenceEvent, ListGeofenceEventsQuery};
use domain::services::GeofenceEventStore;
use domain::{GeofenceError, GeofenceResult};

use crate::entities::GeofenceEventEntity;
use crate::metrics::QueryTimer;

/// Repository for geofence event operations.
#[derive(Clone)]
pub struct GeofenceEventRepository {
    pool: PgPool,
}

impl GeofenceEventRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a geofence event.
    pub async fn insert(&self, event: &GeofenceEvent) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_geofence_event");
        let result = sqlx::query(
            r#"
            INSERT INTO geofence_events (id, tenant_id, actor_id, geofence_id, event_type,
                                         latitude, longitude, occurred_at, processed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.id)
        .bind(event.tenant_id)
        .bind(event.actor_id)
        .bind(event.geofence_id)
        .bind(event.event_type.as_str())
        .bind(event.coordinate.latitude)
        .bind(event.coordinate.longitude)
        .bind(event.occurred_at)
        .bind(event.processed_at)
        .bind(event.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Set `processed_at`. Returns whether the event exists.
    pub async fn mark_processed(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_geofence_event_processed");
        let result = sqlx::query(
            r#"
            UPDATE geofence_events
            SET processed_at = $3
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(event_id)
        .bind(processed_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Events of a tenant with the geofence name joined in, newest first.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        actor_id: Option<Uuid>,
        geofence_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<GeofenceEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_geofence_events");
        let result = sqlx::query_as::<_, GeofenceEventEntity>(
            r#"
            SELECT
                e.id, e.tenant_id, e.actor_id, e.geofence_id,
                g.name AS geofence_name,
                e.event_type, e.latitude, e.longitude,
                e.occurred_at, e.processed_at, e.created_at
            FROM geofence_events e
            LEFT JOIN geofences g ON e.geofence_id = g.id
            WHERE e.tenant_id = $1
              AND ($2::uuid IS NULL OR e.actor_id = $2)
              AND ($3::uuid IS NULL OR e.geofence_id = $3)
            ORDER BY e.occurred_at DESC
            LIMIT $4
            "#,
        )
        .bind(tenant_id)
        .bind(actor_id)
        .bind(geofence_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count events matching the same filters as [`Self::list`].
    pub async fn count(
        &self,
        tenant_id: Uuid,
        actor_id: Option<Uuid>,
        geofence_id: Option<Uuid>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_geofence_events");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM geofence_events
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR actor_id = $2)
              AND ($3::uuid IS NULL OR geofence_id = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(actor_id)
        .bind(geofence_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result?.0)
    }
}

#[async_trait::async_trait]
impl GeofenceEventStore for GeofenceEventRepository {
    async fn insert(&self, event: &GeofenceEvent) -> GeofenceResult<()> {
        GeofenceEventRepository::insert(self, event)
            .await
            .map_err(GeofenceError::persistence)
    }

    async fn mark_processed(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> GeofenceResult<()> {
        let found = GeofenceEventRepository::mark_processed(self, tenant_id, event_id, processed_at)
            .await
            .map_err(GeofenceError::persistence)?;
        if found {
            Ok(())
        } else {
            Err(GeofenceError::NotFound(format!("geofence event {}", event_id)))
        }
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        query: &ListGeofenceEventsQuery,
    ) -> GeofenceResult<Vec<GeofenceEvent>> {
        GeofenceEventRepository::list(
            self,
            tenant_id,
            query.actor_id,
            query.geofence_id,
            query.effective_limit(),
        )
        .await
        .map_err(GeofenceError::persistence)?
        .into_iter()
        .map(GeofenceEvent::try_from)
        .collect()
    }

    async fn count(&self, tenant_id: Uuid, query: &ListGeofenceEventsQuery) -> GeofenceResult<i64> {
        GeofenceEventRepository::count(self, tenant_id, query.actor_id, query.geofence_id)
            .await
            .map_err(GeofenceError::persistence)
    }
}
