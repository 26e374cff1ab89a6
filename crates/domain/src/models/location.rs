//! Location domain models.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{GeofenceError, GeofenceResult};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting values outside the valid ranges
    /// (latitude in [-90, 90], longitude in [-180, 180]) and NaN.
    pub fn new(latitude: f64, longitude: f64) -> GeofenceResult<Self> {
        shared::validation::validate_latitude(latitude).map_err(|_| {
            GeofenceError::InvalidCoordinate(format!("latitude {} out of range", latitude))
        })?;
        shared::validation::validate_longitude(longitude).map_err(|_| {
            GeofenceError::InvalidCoordinate(format!("longitude {} out of range", longitude))
        })?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Creates a coordinate without range checks.
    ///
    /// Only for values that were validated before they were stored.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Re-checks the ranges, e.g. after deserializing untrusted input.
    pub fn validate(&self) -> GeofenceResult<()> {
        Self::new(self.latitude, self.longitude).map(|_| ())
    }
}

/// Device information attached to a location report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

/// A single stored GPS observation for a tracked actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub coordinate: Coordinate,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub battery_level: Option<i32>,
    pub device: DeviceMetadata,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A location observation that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLocationReport {
    pub coordinate: Coordinate,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub battery_level: Option<i32>,
    pub device: DeviceMetadata,
    pub recorded_at: DateTime<Utc>,
}

impl NewLocationReport {
    /// Report with only a coordinate, recorded now.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy: None,
            altitude: None,
            heading: None,
            speed: None,
            battery_level: None,
            device: DeviceMetadata::default(),
            recorded_at: Utc::now(),
        }
    }

    /// Materializes the stored form for a tenant and actor.
    pub fn into_report(self, tenant_id: Uuid, actor_id: Uuid) -> LocationReport {
        LocationReport {
            id: Uuid::new_v4(),
            tenant_id,
            actor_id,
            coordinate: self.coordinate,
            accuracy: self.accuracy,
            altitude: self.altitude,
            heading: self.heading,
            speed: self.speed,
            battery_level: self.battery_level,
            device: self.device,
            recorded_at: self.recorded_at,
            created_at: Utc::now(),
        }
    }
}

/// Request payload for submitting a location.
///
/// POST /api/v1/locations
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLocationRequest {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    pub altitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_speed"))]
    pub speed: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_battery_level"))]
    pub battery_level: Option<i32>,

    /// Capture time in milliseconds since epoch; defaults to server time.
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub timestamp: Option<i64>,

    #[serde(default)]
    pub device: DeviceMetadata,
}

impl SubmitLocationRequest {
    /// Converts the validated request into a report input.
    pub fn into_new_report(self) -> GeofenceResult<NewLocationReport> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)?;
        let recorded_at = match self.timestamp {
            Some(millis) => Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                GeofenceError::InvalidReport(format!("invalid timestamp {}", millis))
            })?,
            None => Utc::now(),
        };

        Ok(NewLocationReport {
            coordinate,
            accuracy: self.accuracy,
            altitude: self.altitude,
            heading: self.heading,
            speed: self.speed,
            battery_level: self.battery_level,
            device: self.device,
            recorded_at,
        })
    }
}

/// Response payload for a location submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLocationResponse {
    pub report_id: Uuid,
    pub event_ids: Vec<Uuid>,
}

/// Geofences currently containing an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGeofencesResponse {
    pub actor_id: Uuid,
    pub geofence_ids: Vec<Uuid>,
}

/// Response payload for the retention sweep endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeLocationsResponse {
    pub deleted_count: u64,
}
