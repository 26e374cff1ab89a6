//! Geofence domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{GeofenceError, GeofenceResult};
use crate::models::location::Coordinate;

/// Kind of campus area a geofence describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeofenceType {
    SchoolGrounds,
    Classroom,
    Library,
    Cafeteria,
    Playground,
    BusRoute,
    Gymnasium,
    ParkingLot,
    Custom,
}

impl GeofenceType {
    /// Whether entering a geofence of this type triggers auto-attendance.
    pub fn is_school_grounds(&self) -> bool {
        matches!(self, GeofenceType::SchoolGrounds)
    }

    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceType::SchoolGrounds => "SCHOOL_GROUNDS",
            GeofenceType::Classroom => "CLASSROOM",
            GeofenceType::Library => "LIBRARY",
            GeofenceType::Cafeteria => "CAFETERIA",
            GeofenceType::Playground => "PLAYGROUND",
            GeofenceType::BusRoute => "BUS_ROUTE",
            GeofenceType::Gymnasium => "GYMNASIUM",
            GeofenceType::ParkingLot => "PARKING_LOT",
            GeofenceType::Custom => "CUSTOM",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHOOL_GROUNDS" => Some(GeofenceType::SchoolGrounds),
            "CLASSROOM" => Some(GeofenceType::Classroom),
            "LIBRARY" => Some(GeofenceType::Library),
            "CAFETERIA" => Some(GeofenceType::Cafeteria),
            "PLAYGROUND" => Some(GeofenceType::Playground),
            "BUS_ROUTE" => Some(GeofenceType::BusRoute),
            "GYMNASIUM" => Some(GeofenceType::Gymnasium),
            "PARKING_LOT" => Some(GeofenceType::ParkingLot),
            "CUSTOM" => Some(GeofenceType::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeofenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region covered by a geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeofenceShape {
    #[serde(rename_all = "camelCase")]
    Circular {
        center: Coordinate,
        radius_meters: f64,
    },
    /// GeoJSON `Polygon` or `MultiPolygon` geometry, interpreted by the spatial engine.
    Polygon { geometry: serde_json::Value },
}

impl GeofenceShape {
    /// Builds a shape from nullable storage columns.
    ///
    /// Exactly one of {center + radius, polygon} must be populated.
    pub fn from_parts(
        center_latitude: Option<f64>,
        center_longitude: Option<f64>,
        radius_meters: Option<f64>,
        polygon: Option<serde_json::Value>,
    ) -> GeofenceResult<Self> {
        let shape = match (center_latitude, center_longitude, radius_meters, polygon) {
            (Some(lat), Some(lon), Some(radius), None) => GeofenceShape::Circular {
                center: Coordinate::new(lat, lon)
                    .map_err(|e| GeofenceError::InvalidGeofence(e.to_string()))?,
                radius_meters: radius,
            },
            (None, None, None, Some(geometry)) => GeofenceShape::Polygon { geometry },
            (None, None, None, None) => {
                return Err(GeofenceError::InvalidGeofence(
                    "neither circle nor polygon is populated".to_string(),
                ))
            }
            _ => {
                return Err(GeofenceError::InvalidGeofence(
                    "a geofence needs either center and radius or a polygon".to_string(),
                ))
            }
        };
        shape.check()?;
        Ok(shape)
    }

    /// Checks the shape invariants: a finite, non-negative radius or a
    /// polygon-typed GeoJSON geometry.
    pub fn check(&self) -> GeofenceResult<()> {
        match self {
            GeofenceShape::Circular { radius_meters, .. } => {
                if radius_meters.is_finite() && *radius_meters >= 0.0 {
                    Ok(())
                } else {
                    Err(GeofenceError::InvalidGeofence(format!(
                        "radius {} must be a non-negative number of meters",
                        radius_meters
                    )))
                }
            }
            GeofenceShape::Polygon { geometry } => {
                shared::validation::validate_polygon_geometry(geometry)
                    .map_err(|e| GeofenceError::InvalidGeofence(e.to_string()))
            }
        }
    }

    /// Storage columns: (center_latitude, center_longitude, radius_meters, polygon).
    pub fn to_parts(&self) -> (Option<f64>, Option<f64>, Option<f64>, Option<&serde_json::Value>) {
        match self {
            GeofenceShape::Circular {
                center,
                radius_meters,
            } => (
                Some(center.latitude),
                Some(center.longitude),
                Some(*radius_meters),
                None,
            ),
            GeofenceShape::Polygon { geometry } => (None, None, None, Some(geometry)),
        }
    }
}

/// Represents a geofence in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub geofence_type: GeofenceType,
    pub shape: GeofenceShape,
    pub active: bool,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Geofence {
    /// Creates an active geofence with fresh identity and timestamps.
    pub fn new(
        tenant_id: Uuid,
        name: impl Into<String>,
        geofence_type: GeofenceType,
        shape: GeofenceShape,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            geofence_type,
            shape,
            active: true,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_active() -> bool {
    true
}

/// Request payload for creating a geofence.
///
/// Either `centerLatitude` + `centerLongitude` + `radiusMeters` or `polygon`
/// must be given, never both.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeofenceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub geofence_type: GeofenceType,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub center_latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub center_longitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_radius"))]
    pub radius_meters: Option<f64>,

    pub polygon: Option<serde_json::Value>,

    #[serde(default = "default_active")]
    pub active: bool,

    pub metadata: Option<serde_json::Value>,
}

impl CreateGeofenceRequest {
    /// Resolves the requested shape.
    pub fn shape(&self) -> GeofenceResult<GeofenceShape> {
        GeofenceShape::from_parts(
            self.center_latitude,
            self.center_longitude,
            self.radius_meters,
            self.polygon.clone(),
        )
    }
}

/// Request payload for updating a geofence (partial update).
///
/// Shape fields replace the shape as a whole: send all three circle fields
/// or a polygon.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGeofenceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub geofence_type: Option<GeofenceType>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub center_latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub center_longitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_radius"))]
    pub radius_meters: Option<f64>,

    pub polygon: Option<serde_json::Value>,

    pub active: Option<bool>,

    pub metadata: Option<serde_json::Value>,
}

impl UpdateGeofenceRequest {
    /// Returns the replacement shape, if any shape field was sent.
    pub fn shape(&self) -> GeofenceResult<Option<GeofenceShape>> {
        let untouched = self.center_latitude.is_none()
            && self.center_longitude.is_none()
            && self.radius_meters.is_none()
            && self.polygon.is_none();
        if untouched {
            return Ok(None);
        }
        GeofenceShape::from_parts(
            self.center_latitude,
            self.center_longitude,
            self.radius_meters,
            self.polygon.clone(),
        )
        .map(Some)
    }

    /// Applies the update to a geofence in place.
    pub fn apply(&self, geofence: &mut Geofence) -> GeofenceResult<()> {
        if let Some(shape) = self.shape()? {
            geofence.shape = shape;
        }
        if let Some(name) = &self.name {
            geofence.name = name.clone();
        }
        if let Some(geofence_type) = self.geofence_type {
            geofence.geofence_type = geofence_type;
        }
        if let Some(active) = self.active {
            geofence.active = active;
        }
        if let Some(metadata) = &self.metadata {
            geofence.metadata = Some(metadata.clone());
        }
        geofence.updated_at = Utc::now();
        Ok(())
    }
}

/// Response payload for geofence operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceResponse {
    pub id: Uuid,
    pub name: String,
    pub geofence_type: GeofenceType,
    pub shape: GeofenceShape,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Geofence> for GeofenceResponse {
    fn from(g: Geofence) -> Self {
        Self {
            id: g.id,
            name: g.name,
            geofence_type: g.geofence_type,
            shape: g.shape,
            active: g.active,
            metadata: g.metadata,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

/// Response for listing geofences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofencesResponse {
    pub geofences: Vec<GeofenceResponse>,
    pub total: usize,
}

/// Query parameters for listing geofences.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofencesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
