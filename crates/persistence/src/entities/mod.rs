//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod geofence;
pub mod geofence_event;
pub mod location;

pub use geofence::GeofenceEntity;
pub use geofence_event::GeofenceEventEntity;
pub use location::LocationReportEntity;
