use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::GeofenceTracker;
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{admin, geofence_events, geofences, health, locations};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<GeofenceTracker>,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    /// Absent when running on in-memory stores.
    pub pool: Option<PgPool>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Authenticated by the TenantContext extractor in each handler.
    let api_routes = Router::new()
        .route("/api/v1/locations", post(locations::submit_location))
        .route(
            "/api/v1/actors/:actor_id/geofences",
            get(locations::current_geofences),
        )
        .route(
            "/api/v1/geofences",
            get(geofences::list_geofences).post(geofences::create_geofence),
        )
        .route(
            "/api/v1/geofences/:geofence_id",
            get(geofences::get_geofence)
                .patch(geofences::update_geofence)
                .delete(geofences::delete_geofence),
        )
        .route(
            "/api/v1/geofence-events",
            get(geofence_events::list_geofence_events),
        )
        .route(
            "/api/v1/admin/locations/purge",
            post(admin::purge_locations),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
