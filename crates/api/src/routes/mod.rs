//! HTTP route handlers.

pub mod admin;
pub mod geofence_events;
pub mod geofences;
pub mod health;
pub mod locations;
