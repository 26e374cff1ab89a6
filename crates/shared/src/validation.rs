//! Common validation utilities.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

/// Maximum age of a buffered location report in days.
const MAX_TIMESTAMP_AGE_DAYS: i64 = 7;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Largest geofence radius accepted from administrators (50 km).
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a latitude value is within valid range (-90 to 90).
///
/// NaN is rejected because it fails every range comparison.
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(error("latitude_range", "Latitude must be between -90 and 90"))
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(error("longitude_range", "Longitude must be between -180 and 180"))
    }
}

/// Validates that a geofence radius is positive and at most [`MAX_RADIUS_METERS`].
pub fn validate_radius(radius: f64) -> Result<(), ValidationError> {
    if radius > 0.0 && radius <= MAX_RADIUS_METERS {
        Ok(())
    } else {
        Err(error(
            "radius_range",
            "Radius must be greater than 0 and at most 50000 meters",
        ))
    }
}

/// Validates that GPS accuracy is non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 {
        Ok(())
    } else {
        Err(error("accuracy_range", "Accuracy must be non-negative"))
    }
}

/// Validates that heading is within valid range (0 to 360).
pub fn validate_heading(heading: f64) -> Result<(), ValidationError> {
    if (0.0..=360.0).contains(&heading) {
        Ok(())
    } else {
        Err(error("heading_range", "Heading must be between 0 and 360"))
    }
}

/// Validates that speed is non-negative.
pub fn validate_speed(speed: f64) -> Result<(), ValidationError> {
    if speed >= 0.0 {
        Ok(())
    } else {
        Err(error("speed_range", "Speed must be non-negative"))
    }
}

/// Validates that battery level is within valid range (0 to 100).
pub fn validate_battery_level(level: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        Err(error("battery_range", "Battery level must be between 0 and 100"))
    }
}

/// Validates that a timestamp (in milliseconds since epoch) is within acceptable range.
/// - Must not be more than 5 minutes in the future (allows for clock skew)
/// - Must not be older than 7 days
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    let now = Utc::now();

    let Some(timestamp) = Utc.timestamp_millis_opt(timestamp_millis).single() else {
        return Err(error("timestamp_invalid", "Invalid timestamp format"));
    };

    if timestamp > now + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS) {
        return Err(error("timestamp_future", "Timestamp cannot be in the future"));
    }

    if timestamp < now - chrono::Duration::days(MAX_TIMESTAMP_AGE_DAYS) {
        return Err(error("timestamp_old", "Timestamp cannot be older than 7 days"));
    }

    Ok(())
}

/// Validates that a JSON value is a GeoJSON `Polygon` or `MultiPolygon` geometry
/// with a non-empty `coordinates` array.
///
/// Ring closure and self-intersection are left to the spatial engine.
pub fn validate_polygon_geometry(value: &serde_json::Value) -> Result<(), ValidationError> {
    let kind = value.get("type").and_then(|t| t.as_str());
    if !matches!(kind, Some("Polygon") | Some("MultiPolygon")) {
        return Err(error(
            "polygon_type",
            "Polygon must be a GeoJSON Polygon or MultiPolygon geometry",
        ));
    }

    match value.get("coordinates").and_then(|c| c.as_array()) {
        Some(rings) if !rings.is_empty() => Ok(()),
        _ => Err(error("polygon_coordinates", "Polygon coordinates must not be empty")),
    }
}
