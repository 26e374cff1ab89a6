//! Shared utilities and common types for the campus geofence backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate and telemetry validation
//! - Tenant-scoped JWT token handling

pub mod jwt;
pub mod validation;
