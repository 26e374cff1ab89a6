//! In-memory stores for tests and local runs without PostgreSQL.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{GeofenceError, GeofenceResult};
use crate::models::geofence::Geofence;
use crate::models::geofence_event::{GeofenceEvent, ListGeofenceEventsQuery};
use crate::models::location::LocationReport;
use crate::services::store::{GeofenceEventStore, GeofenceStore, LocationStore};

/// Implements every store trait over process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    geofences: RwLock<HashMap<Uuid, Geofence>>,
    locations: RwLock<Vec<LocationReport>>,
    events: RwLock<Vec<GeofenceEvent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an event by id regardless of tenant.
    pub async fn event(&self, id: Uuid) -> Option<GeofenceEvent> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Ids of all stored location reports in insertion order.
    pub async fn location_ids(&self) -> Vec<Uuid> {
        self.locations.read().await.iter().map(|r| r.id).collect()
    }
}

fn event_matches(event: &GeofenceEvent, tenant_id: Uuid, query: &ListGeofenceEventsQuery) -> bool {
    event.tenant_id == tenant_id
        && query.actor_id.map_or(true, |id| event.actor_id == id)
        && query.geofence_id.map_or(true, |id| event.geofence_id == id)
}

#[async_trait::async_trait]
impl GeofenceStore for InMemoryStore {
    async fn find_active(&self, tenant_id: Uuid) -> GeofenceResult<Vec<Geofence>> {
        GeofenceStore::list(self, tenant_id, false).await
    }

    async fn create(&self, geofence: &Geofence) -> GeofenceResult<()> {
        let mut geofences = self.geofences.write().await;
        if geofences.contains_key(&geofence.id) {
            return Err(GeofenceError::Persistence(format!(
                "geofence {} already exists",
                geofence.id
            )));
        }
        geofences.insert(geofence.id, geofence.clone());
        Ok(())
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<Option<Geofence>> {
        Ok(self
            .geofences
            .read()
            .await
            .get(&id)
            .filter(|g| g.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: Uuid, include_inactive: bool) -> GeofenceResult<Vec<Geofence>> {
        let mut geofences: Vec<Geofence> = self
            .geofences
            .read()
            .await
            .values()
            .filter(|g| g.tenant_id == tenant_id && (include_inactive || g.active))
            .cloned()
            .collect();
        geofences.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(geofences)
    }

    async fn update(&self, geofence: &Geofence) -> GeofenceResult<bool> {
        let mut geofences = self.geofences.write().await;
        match geofences.get_mut(&geofence.id) {
            Some(existing) if existing.tenant_id == geofence.tenant_id => {
                *existing = geofence.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<bool> {
        let removed = {
            let mut geofences = self.geofences.write().await;
            match geofences.get(&id) {
                Some(g) if g.tenant_id == tenant_id => geofences.remove(&id).is_some(),
                _ => false,
            }
        };
        if removed {
            self.events.write().await.retain(|e| e.geofence_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl LocationStore for InMemoryStore {
    async fn insert(&self, report: &LocationReport) -> GeofenceResult<()> {
        self.locations.write().await.push(report.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> GeofenceResult<Option<LocationReport>> {
        Ok(self
            .locations
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.tenant_id == tenant_id && r.actor_id == actor_id)
            .cloned())
    }

    async fn delete_recorded_before(
        &self,
        tenant_id: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> GeofenceResult<u64> {
        let mut locations = self.locations.write().await;
        let before = locations.len();
        locations.retain(|r| {
            let in_scope = tenant_id.map_or(true, |t| r.tenant_id == t);
            !(in_scope && r.recorded_at < cutoff)
        });
        Ok((before - locations.len()) as u64)
    }
}

#[async_trait::async_trait]
impl GeofenceEventStore for InMemoryStore {
    async fn insert(&self, event: &GeofenceEvent) -> GeofenceResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn mark_processed(
        &self,
        tenant_id: Uuid,
        event_id: Uuid,
        processed_at: DateTime<Utc>,
    ) -> GeofenceResult<()> {
        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id && e.tenant_id == tenant_id)
            .ok_or_else(|| GeofenceError::NotFound(format!("geofence event {}", event_id)))?;
        event.processed_at = Some(processed_at);
        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        query: &ListGeofenceEventsQuery,
    ) -> GeofenceResult<Vec<GeofenceEvent>> {
        let geofences = self.geofences.read().await;
        let mut events: Vec<GeofenceEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| event_matches(e, tenant_id, query))
            .cloned()
            .map(|mut e| {
                if let Some(g) = geofences.get(&e.geofence_id) {
                    e.geofence_name = Some(g.name.clone());
                }
                e
            })
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        events.truncate(query.effective_limit() as usize);
        Ok(events)
    }

    async fn count(&self, tenant_id: Uuid, query: &ListGeofenceEventsQuery) -> GeofenceResult<i64> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| event_matches(e, tenant_id, query))
            .count() as i64)
    }
}
