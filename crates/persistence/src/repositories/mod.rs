//! Repository implementations for database operations.

pub mod geofence;
pub mod geofence_event;
pub mod location;

pub use geofence::GeofenceRepository;
pub use geofence_event::GeofenceEventRepository;
pub use location::LocationRepository;
