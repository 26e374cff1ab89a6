//! Database metrics: query latency and pool gauges.

use std::time::Instant;

use metrics::{gauge, histogram};
use sqlx::PgPool;

/// Times one repository query and records it as
/// `database_query_duration_seconds{query}`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_active_geofences");
/// let result = sqlx::query_as::<_, GeofenceEntity>(...).fetch_all(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        histogram!("database_query_duration_seconds", "query" => self.query)
            .record(self.start.elapsed().as_secs_f64());
    }
}

/// Publishes connection pool gauges. Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("insert_location_report");
        assert_eq!(timer.query, "insert_location_report");
        timer.record();
    }
}
