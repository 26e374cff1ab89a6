//! Domain services for geofence tracking.
//!
//! Services contain the tracking logic that operates on domain models.

pub mod attendance;
pub mod evaluator;
pub mod geo;
pub mod memory;
pub mod recorder;
pub mod retention;
pub mod spatial;
pub mod store;
pub mod tracker;
pub mod transition;

pub use attendance::{
    AttendanceError, AttendanceHook, LoggingAttendanceHook, MockAttendanceHook, SchoolEntry,
};
pub use evaluator::{evaluate, inside_set};
pub use geo::{distance_meters, is_inside_circle, EARTH_RADIUS_METERS};
pub use memory::InMemoryStore;
pub use recorder::EventRecorder;
pub use retention::{RetentionPolicy, RetentionSweeper, LOCATION_RETENTION_DAYS};
pub use spatial::{GeoSpatialEngine, PolygonMembership, SpatialEngine};
pub use store::{GeofenceEventStore, GeofenceStore, LocationStore};
pub use tracker::{GeofenceTracker, SubmitLocationOutcome};
pub use transition::{apply_transitions, classify};
