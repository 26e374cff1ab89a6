//! Domain models for campus geofence tracking.

pub mod geofence;
pub mod geofence_event;
pub mod location;
pub mod membership;

pub use geofence::{Geofence, GeofenceShape, GeofenceType};
pub use geofence_event::{GeofenceEvent, GeofenceEventType};
pub use location::{Coordinate, DeviceMetadata, LocationReport, NewLocationReport};
pub use membership::{MembershipResult, Transition};
