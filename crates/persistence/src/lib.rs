//! Persistence layer for the campus geofence service.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain stores
//! - The PostGIS spatial engine

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod spatial;

pub use spatial::PostgisSpatialEngine;
