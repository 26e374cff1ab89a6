use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use campus_geofence_api::app::{self, AppState};
use campus_geofence_api::config::{Config, SpatialEngineKind};
use campus_geofence_api::jobs::{CleanupLocationsJob, JobScheduler, PoolMetricsJob};
use campus_geofence_api::middleware;
use domain::services::{
    GeoSpatialEngine, GeofenceTracker, LoggingAttendanceHook, RetentionPolicy, SpatialEngine,
};
use persistence::repositories::{GeofenceEventRepository, GeofenceRepository, LocationRepository};
use persistence::PostgisSpatialEngine;
use shared::jwt::JwtConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting campus geofence service v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let engine: Arc<dyn SpatialEngine> = match config.tracking.spatial_engine {
        SpatialEngineKind::Postgis => Arc::new(PostgisSpatialEngine::new(pool.clone())),
        SpatialEngineKind::Geo => Arc::new(GeoSpatialEngine::new()),
    };
    info!(engine = ?config.tracking.spatial_engine, "Spatial engine selected");

    let tracker = Arc::new(GeofenceTracker::new(
        Arc::new(GeofenceRepository::new(pool.clone())),
        Arc::new(
            LocationRepository::new(pool.clone())
                .with_purge_batch_size(config.tracking.cleanup_batch_size),
        ),
        Arc::new(GeofenceEventRepository::new(pool.clone())),
        engine,
        Arc::new(LoggingAttendanceHook),
        RetentionPolicy::new(config.tracking.retention_days),
    ));

    let jwt = JwtConfig::from_rsa_pem(&config.jwt.public_key, config.jwt.leeway_secs)
        .context("Invalid JWT key configuration")?;

    let mut scheduler = JobScheduler::new();
    scheduler.register(CleanupLocationsJob::new(tracker.clone()));
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(AppState {
        tracker,
        config: Arc::new(config),
        jwt: Arc::new(jwt),
        pool: Some(pool),
    });

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
