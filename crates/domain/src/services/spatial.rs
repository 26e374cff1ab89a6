//! Polygon geofence membership.
//!
//! Polygon containment is delegated to a [`SpatialEngine`]. Production uses
//! PostGIS (see the persistence crate); [`GeoSpatialEngine`] evaluates
//! GeoJSON polygons in process with the `geo` crate.

use geo::{Closest, ClosestPoint, Intersects, MultiPolygon, Point};

use crate::error::{GeofenceError, GeofenceResult};
use crate::models::location::Coordinate;
use crate::services::geo::distance_meters;

/// Result of a point-in-polygon query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMembership {
    pub inside: bool,
    /// Meters from the point to the polygon; 0 when inside.
    pub distance_meters: f64,
}

impl PolygonMembership {
    /// Membership that could not be determined.
    pub const UNDETERMINED: PolygonMembership = PolygonMembership {
        inside: false,
        distance_meters: f64::INFINITY,
    };
}

/// Point-in-polygon and point-to-polygon distance.
#[async_trait::async_trait]
pub trait SpatialEngine: Send + Sync {
    /// Tests `point` against a GeoJSON `Polygon`/`MultiPolygon` geometry.
    /// Points on the boundary count as inside.
    async fn polygon_membership(
        &self,
        point: Coordinate,
        geometry: &serde_json::Value,
    ) -> GeofenceResult<PolygonMembership>;
}

/// In-process spatial engine backed by the `geo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoSpatialEngine;

impl GeoSpatialEngine {
    pub fn new() -> Self {
        Self
    }

    /// Same as [`SpatialEngine::polygon_membership`], synchronously.
    pub fn membership(
        &self,
        point: Coordinate,
        geometry: &serde_json::Value,
    ) -> GeofenceResult<PolygonMembership> {
        let polygons = parse_polygons(geometry)?;
        let target = Point::new(point.longitude, point.latitude);

        if polygons.intersects(&target) {
            return Ok(PolygonMembership {
                inside: true,
                distance_meters: 0.0,
            });
        }

        // The nearest boundary point is found in planar lon/lat space and
        // then measured on the sphere; close enough for campus-sized shapes.
        let nearest = match polygons.closest_point(&target) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p,
            Closest::Indeterminate => {
                return Err(GeofenceError::SpatialEngine(
                    "no closest point for polygon".to_string(),
                ))
            }
        };

        Ok(PolygonMembership {
            inside: false,
            distance_meters: distance_meters(
                point,
                Coordinate::new_unchecked(nearest.y(), nearest.x()),
            ),
        })
    }
}

#[async_trait::async_trait]
impl SpatialEngine for GeoSpatialEngine {
    async fn polygon_membership(
        &self,
        point: Coordinate,
        geometry: &serde_json::Value,
    ) -> GeofenceResult<PolygonMembership> {
        self.membership(point, geometry)
    }
}

fn parse_polygons(value: &serde_json::Value) -> GeofenceResult<MultiPolygon<f64>> {
    let geometry: geojson::Geometry = serde_json::from_value(value.clone())
        .map_err(|e| GeofenceError::SpatialEngine(format!("invalid GeoJSON: {}", e)))?;

    let shape = geo::Geometry::<f64>::try_from(geometry)
        .map_err(|e| GeofenceError::SpatialEngine(format!("unsupported geometry: {}", e)))?;

    match shape {
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        geo::Geometry::MultiPolygon(polygons) => Ok(polygons),
        _ => Err(GeofenceError::SpatialEngine(
            "geometry is not a polygon".to_string(),
        )),
    }
}
