//! Domain layer for the campus geofence backend.
//!
//! This crate contains:
//! - Domain models (Geofence, LocationReport, GeofenceEvent)
//! - Geofence membership and transition logic
//! - Store and collaborator traits implemented by outer layers
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{GeofenceError, GeofenceResult};
