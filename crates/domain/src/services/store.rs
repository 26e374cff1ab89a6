//! Storage collaborators used by the tracking core.
//!
//! Every operation is scoped by tenant. Implementations live in the
//! persistence crate (PostgreSQL) and in [`crate::services::memory`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GeofenceResult;
use crate::models::geofence::Geofence;
use crate::models::geofence_event::{GeofenceEvent, ListGeofenceEventsQuery};
use crate::models::location::LocationReport;

#[async_trait::async_trait]
pub trait GeofenceStore: Send + Sync {
    /// Active geofences of a tenant.
    async fn find_active(&self, tenant_id: Uuid) -> GeofenceResult<Vec<Geofence>>;

    async fn create(&self, geofence: &Geofence) -> GeofenceResult<()>;

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<Option<Geofence>>;

    /// Geofences of a tenant ordered by name.
    async fn list(&self, tenant_id: Uuid, include_inactive: bool) -> GeofenceResult<Vec<Geofence>>;

    /// Overwrites a stored geofence. Returns `false` when it does not exist.
    async fn update(&self, geofence: &Geofence) -> GeofenceResult<bool>;

    /// Deletes a geofence and its events. Returns `false` when it does not exist.
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<bool>;
}

#[async_trait::async_trait]
pub trait LocationStore: Send + Sync {
    async fn insert(&self, report: &LocationReport) -> GeofenceResult<()>;

    /// Most recently stored report of an actor, by arrival rather than `recorded_at`.
    async fn find_latest(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> GeofenceResult<Option<LocationReport>>;

    /// Deletes reports recorded strictly before `cutoff`, for one tenant or
    /// for all tenants when `tenant_id` is `None`. Returns the number deleted.
    async fn delete_recorded_before(
        &self,
        tenant_id: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> GeofenceResult<u64>;
}

#[async_trait::async_trait]
pub trait GeofenceEventStore: Send + Sync {
    async fn insert(&self, event: &GeofenceEvent) -> GeofenceResult<()>;

    /// Sets `processed_at` on an event.
    async fn mark_processed(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> GeofenceResult<()>;

    /// Events of a tenant, newest first, filtered by the query.
    async fn list(
        &self,
        tenant_id: Uuid,
        query: &ListGeofenceEventsQuery,
    ) -> GeofenceResult<Vec<GeofenceEvent>>;

    /// Number of events matching the query filters, ignoring the limit.
    async fn count(&self, tenant_id: Uuid, query: &ListGeofenceEventsQuery) -> GeofenceResult<i64>;
}
