//! # Roster HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! All resource routes live under `/api/v1`:
//!
//! - `GET|POST /courses/` - List (filters: `id`, `name`) / create courses
//! - `GET|PUT|PATCH|DELETE /courses/{id}/` - Retrieve / replace / update / delete
//! - `GET /courses/{id}/capacity/` - Capacity status
//! - `POST|DELETE /courses/{id}/students/{student_id}/` - Enroll / unenroll
//! - `GET|POST /students/` - List (filters: `id`, `name`) / create students
//! - `GET|PUT|PATCH|DELETE /students/{id}/` - Retrieve / replace / update / delete
//! - `GET /health` - Health check
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `ROSTER_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `ROSTER_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `ROSTER_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod error;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use error::ApiError;
pub use middleware::{DEFAULT_RPS, create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    CapacityResponse, CourseJson, CoursePatchRequest, CourseRequest, ErrorResponse,
    HealthResponse, ListQuery, StudentJson, StudentPatchRequest, StudentRequest,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use roster_core::{Roster, RosterError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body (1 MiB).
const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the roster.
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RwLock<Roster>>,
}

impl AppState {
    #[must_use]
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Arc::new(RwLock::new(roster)),
        }
    }
}

// =============================================================================
// SERVER SETTINGS
// =============================================================================

/// HTTP-layer settings: CORS, rate limiting and authentication.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    /// Raw `ROSTER_CORS_ORIGINS` value.
    pub cors_origins: Option<String>,
    /// Requests per second; 0 disables limiting.
    pub rate_limit: u32,
    /// Required API key; `None` disables authentication.
    pub api_key: Option<String>,
}

impl ServerSettings {
    /// Read settings from `ROSTER_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cors_origins: std::env::var("ROSTER_CORS_ORIGINS").ok(),
            rate_limit: get_rate_limit_from_env(),
            api_key: get_api_key_from_env(),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer.
///
/// - `"*"`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (ROSTER_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in ROSTER_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No ROSTER_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8000",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8000",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Resource routes mounted under `/api/v1`.
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route(
            "/courses/{id}/",
            get(handlers::get_course)
                .put(handlers::replace_course)
                .patch(handlers::update_course)
                .delete(handlers::delete_course),
        )
        .route("/courses/{id}/capacity/", get(handlers::course_capacity))
        .route(
            "/courses/{id}/students/{student_id}/",
            post(handlers::enroll_student).delete(handlers::unenroll_student),
        )
        .route(
            "/students/",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{id}/",
            get(handlers::get_student)
                .put(handlers::replace_student)
                .patch(handlers::update_student)
                .delete(handlers::delete_student),
        )
}

/// Create the router using settings from the environment.
pub fn create_router(state: AppState) -> Router {
    create_router_with(state, &ServerSettings::from_env())
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router_with(state: AppState, settings: &ServerSettings) -> Router {
    let cors = build_cors_layer(settings.cors_origins.as_deref());

    let rate_limiter = create_rate_limiter(settings.rate_limit);
    match &rate_limiter {
        Some(_) => tracing::info!(
            "Rate limiting enabled: {} requests/second",
            settings.rate_limit
        ),
        None => tracing::info!("Rate limiting disabled"),
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .nest("/api/v1", resource_routes());

    match settings.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                Arc::<str>::from(key),
                auth::api_key_auth_middleware,
            ));
        }
        None => tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set ROSTER_API_KEY environment variable to enable authentication."
        ),
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, roster: Roster) -> Result<(), RosterError> {
    let router = create_router(AppState::new(roster));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RosterError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Roster HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RosterError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
