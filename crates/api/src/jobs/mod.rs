//! Background jobs: location retention and pool metrics.

mod cleanup_locations;
mod pool_metrics;
mod scheduler;

pub use cleanup_locations::CleanupLocationsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
