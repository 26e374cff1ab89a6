//! Shared fixtures for API tests.
//!
//! The router is wired to the in-memory store and the pure-Rust spatial
//! engine, so these tests need no database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use campus_geofence_api::{
    app::{create_app, AppState},
    config::{
        Config, DatabaseConfig, JwtAuthConfig, LoggingConfig, SecurityConfig, ServerConfig,
        SpatialEngineKind, TrackingConfig,
    },
};
use domain::models::{Geofence, GeofenceShape, GeofenceType};
use domain::models::location::Coordinate;
use domain::services::{
    GeoSpatialEngine, GeofenceStore, GeofenceTracker, InMemoryStore, MockAttendanceHook,
    RetentionPolicy,
};
use shared::jwt::testing::sign_token;
use shared::jwt::{JwtConfig, Role};
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "campus_geofence_test_secret_0123456789";

/// Main entrance of the test campus.
pub const CAMPUS: Coordinate = Coordinate::new_unchecked(24.7136, 46.6753);
/// About 1.1 km north of the campus.
pub const OUTSIDE: Coordinate = Coordinate::new_unchecked(24.7236, 46.6753);

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
        },
        tracking: TrackingConfig {
            retention_days: 30,
            cleanup_batch_size: 10_000,
            spatial_engine: SpatialEngineKind::Geo,
        },
        jwt: JwtAuthConfig {
            public_key: String::new(),
            leeway_secs: 30,
        },
    }
}

/// One tenant with an in-memory backend and a recording attendance hook.
pub struct TestHarness {
    pub tenant_id: Uuid,
    pub store: Arc<InMemoryStore>,
    pub attendance: Arc<MockAttendanceHook>,
    state: AppState,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_attendance(MockAttendanceHook::new())
    }

    pub fn with_attendance(attendance: MockAttendanceHook) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let attendance = Arc::new(attendance);
        let config = test_config();
        let jwt = Arc::new(JwtConfig::from_secret(TEST_JWT_SECRET));

        let tracker = Arc::new(GeofenceTracker::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(GeoSpatialEngine::new()),
            attendance.clone(),
            RetentionPolicy::new(config.tracking.retention_days),
        ));

        let state = AppState {
            tracker,
            config: Arc::new(config),
            jwt,
            pool: None,
        };

        Self {
            tenant_id: Uuid::new_v4(),
            store,
            attendance,
            state,
        }
    }

    /// A fresh router over the shared state; `oneshot` consumes it.
    pub fn app(&self) -> Router {
        create_app(self.state.clone())
    }

    pub fn token(&self, actor_id: Uuid, role: Role) -> String {
        self.token_for_tenant(self.tenant_id, actor_id, role)
    }

    pub fn token_for_tenant(&self, tenant_id: Uuid, actor_id: Uuid, role: Role) -> String {
        sign_token(TEST_JWT_SECRET, actor_id, tenant_id, role, 3600).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token(Uuid::new_v4(), Role::Admin)
    }

    /// Stores a 100 m circle around the campus entrance directly.
    pub async fn seed_circle(&self, name: &str, geofence_type: GeofenceType) -> Geofence {
        let geofence = Geofence::new(
            self.tenant_id,
            name,
            geofence_type,
            GeofenceShape::Circular {
                center: CAMPUS,
                radius_meters: 100.0,
            },
        );
        GeofenceStore::create(self.store.as_ref(), &geofence)
            .await
            .unwrap();
        geofence
    }
}

pub fn location_body(at: Coordinate) -> serde_json::Value {
    serde_json::json!({
        "latitude": at.latitude,
        "longitude": at.longitude,
        "accuracy": 8.5,
    })
}

/// Build a JSON request with authentication.
pub fn json_request_with_auth(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a GET request with authentication.
pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Build a DELETE request with authentication.
pub fn delete_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Parse a response body as JSON, or `Null` when it is empty or not JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
