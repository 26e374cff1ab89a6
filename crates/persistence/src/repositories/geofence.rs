//! Geofence repository for database operations.

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use domain::models::geofence::Geofence;
use domain::services::GeofenceStore;
use domain::{GeofenceError, GeofenceResult};

use crate::entities::geofence::{GeofenceEntity, GEOFENCE_COLUMNS};
use crate::metrics::QueryTimer;

/// Repository for geofence-related database operations.
#[derive(Clone)]
pub struct GeofenceRepository {
    pool: PgPool,
}

impl GeofenceRepository {
    /// Creates a new GeofenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a geofence. The polygon, when present, is stored as SRID 4326 geometry.
    pub async fn create(&self, geofence: &Geofence) -> Result<(), sqlx::Error> {
        let (center_latitude, center_longitude, radius_meters, polygon) = geofence.shape.to_parts();

        let timer = QueryTimer::new("create_geofence");
        let result = sqlx::query(
            r#"
            INSERT INTO geofences (id, tenant_id, name, geofence_type, center_latitude,
                                   center_longitude, radius_meters, polygon, active, metadata,
                                   created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                    ST_SetSRID(ST_GeomFromGeoJSON($8::text), 4326), $9, $10, $11, $12)
            "#,
        )
        .bind(geofence.id)
        .bind(geofence.tenant_id)
        .bind(&geofence.name)
        .bind(geofence.geofence_type.as_str())
        .bind(center_latitude)
        .bind(center_longitude)
        .bind(radius_meters)
        .bind(polygon.map(|p| p.to_string()))
        .bind(geofence.active)
        .bind(&geofence.metadata)
        .bind(geofence.created_at)
        .bind(geofence.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Find a geofence of a tenant by id.
    pub async fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GeofenceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_geofence_by_id");
        let result = sqlx::query_as::<_, GeofenceEntity>(&format!(
            "SELECT {} FROM geofences WHERE tenant_id = $1 AND id = $2",
            GEOFENCE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List geofences of a tenant ordered by name.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<GeofenceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_geofences");
        let result = sqlx::query_as::<_, GeofenceEntity>(&format!(
            r#"
            SELECT {} FROM geofences
            WHERE tenant_id = $1 AND ($2 OR active = true)
            ORDER BY name, created_at
            "#,
            GEOFENCE_COLUMNS
        ))
        .bind(tenant_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overwrite every mutable column of a geofence.
    pub async fn update(&self, geofence: &Geofence) -> Result<bool, sqlx::Error> {
        let (center_latitude, center_longitude, radius_meters, polygon) = geofence.shape.to_parts();

        let timer = QueryTimer::new("update_geofence");
        let result = sqlx::query(
            r#"
            UPDATE geofences
            SET name = $3,
                geofence_type = $4,
                center_latitude = $5,
                center_longitude = $6,
                radius_meters = $7,
                polygon = ST_SetSRID(ST_GeomFromGeoJSON($8::text), 4326),
                active = $9,
                metadata = $10,
                updated_at = $11
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(geofence.tenant_id)
        .bind(geofence.id)
        .bind(&geofence.name)
        .bind(geofence.geofence_type.as_str())
        .bind(center_latitude)
        .bind(center_longitude)
        .bind(radius_meters)
        .bind(polygon.map(|p| p.to_string()))
        .bind(geofence.active)
        .bind(&geofence.metadata)
        .bind(geofence.updated_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Delete a geofence; its events go with it.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_geofence");
        let result = sqlx::query("DELETE FROM geofences WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}

/// Converts rows, dropping the ones that do not form a valid geofence.
fn into_geofences(entities: Vec<GeofenceEntity>) -> Vec<Geofence> {
    entities
        .into_iter()
        .filter_map(|entity| {
            let id = entity.id;
            Geofence::try_from(entity)
                .map_err(|e| warn!(geofence_id = %id, error = %e, "Skipping malformed geofence row"))
                .ok()
        })
        .collect()
}

#[async_trait::async_trait]
impl GeofenceStore for GeofenceRepository {
    async fn find_active(&self, tenant_id: Uuid) -> GeofenceResult<Vec<Geofence>> {
        let entities = self
            .list(tenant_id, false)
            .await
            .map_err(GeofenceError::persistence)?;
        Ok(into_geofences(entities))
    }

    async fn create(&self, geofence: &Geofence) -> GeofenceResult<()> {
        GeofenceRepository::create(self, geofence)
            .await
            .map_err(GeofenceError::persistence)
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<Option<Geofence>> {
        GeofenceRepository::find_by_id(self, tenant_id, id)
            .await
            .map_err(GeofenceError::persistence)?
            .map(Geofence::try_from)
            .transpose()
    }

    async fn list(&self, tenant_id: Uuid, include_inactive: bool) -> GeofenceResult<Vec<Geofence>> {
        let entities = GeofenceRepository::list(self, tenant_id, include_inactive)
            .await
            .map_err(GeofenceError::persistence)?;
        Ok(into_geofences(entities))
    }

    async fn update(&self, geofence: &Geofence) -> GeofenceResult<bool> {
        GeofenceRepository::update(self, geofence)
            .await
            .map_err(GeofenceError::persistence)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> GeofenceResult<bool> {
        GeofenceRepository::delete(self, tenant_id, id)
            .await
            .map_err(GeofenceError::persistence)
    }
}
