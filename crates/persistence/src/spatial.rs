//! PostGIS-backed polygon membership.

use sqlx::PgPool;

use domain::models::location::Coordinate;
use domain::services::spatial::{PolygonMembership, SpatialEngine};
use domain::{GeofenceError, GeofenceResult};

use crate::metrics::QueryTimer;

/// Evaluates GeoJSON polygons with `ST_Covers` (boundary inclusive) and a
/// geography distance in meters.
#[derive(Clone)]
pub struct PostgisSpatialEngine {
    pool: PgPool,
}

impl PostgisSpatialEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SpatialEngine for PostgisSpatialEngine {
    async fn polygon_membership(
        &self,
        point: Coordinate,
        geometry: &serde_json::Value,
    ) -> GeofenceResult<PolygonMembership> {
        let timer = QueryTimer::new("polygon_membership");
        let result: Result<(bool, f64), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT ST_Covers(q.area, q.pt) AS inside,
                   ST_Distance(q.area::geography, q.pt::geography) AS distance
            FROM (
                SELECT ST_SetSRID(ST_GeomFromGeoJSON($1::text), 4326) AS area,
                       ST_SetSRID(ST_MakePoint($2, $3), 4326) AS pt
            ) AS q
            "#,
        )
        .bind(geometry.to_string())
        .bind(point.longitude)
        .bind(point.latitude)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        let (inside, distance) =
            result.map_err(|e| GeofenceError::SpatialEngine(e.to_string()))?;

        Ok(PolygonMembership {
            inside,
            distance_meters: if inside { 0.0 } else { distance },
        })
    }
}
