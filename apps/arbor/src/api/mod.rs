//! # Arbor HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `POST /people` - Register a person
//! - `PUT /people/{id}` - Update a person's attributes
//! - `POST /people/{id}/family` - Propose a family member (new or existing)
//! - `POST /people/{id}/spouse` - Propose a spouse
//! - `POST /people/{id}/confirm` - Confirm or decline a pending link
//! - `POST /people/{id}/detach` - Administrative detach of all edges
//! - `DELETE /people/{id}` - Delete a person
//! - `GET /people` - Person summaries
//! - `GET /people/{id}/tree` - Genealogy tree (optional direction/depth)
//! - `GET /people/by-name/{name}/tree` - Tree by display name
//! - `GET /people/{id}/same-generation` - Generational peers
//! - `GET /people/{id}/pending-confirmations` - Open pending links
//! - `GET /people/{id}/kinship` - Kinship label toward a named person
//! - `GET /health`, `GET /status` - Liveness and graph counts
//!
//! ## Configuration (Environment Variables)
//!
//! - `ARBOR_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `ARBOR_PENDING_TTL_SECS`: Pending-link TTL in seconds (default: 30 days, 0 disables expiry)
//! - `ARBOR_SWEEP_INTERVAL_SECS`: Expiry sweep period in seconds (default: 3600)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `arbor::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    confirm_handler, delete_handler, detach_handler, family_handler, health_handler,
    kinship_handler, list_handler, pending_handler, register_handler, same_generation_handler,
    spouse_handler, status_handler, tree_by_name_handler, tree_handler, update_handler,
};
#[allow(unused_imports)]
pub use types::{
    ConfirmRequest, ConfirmResponse, ErrorResponse, FamilyMemberRequest, HealthResponse,
    KinshipResponse, PendingJson, PersonJson, PersonRequest, SpouseRequest, StatusResponse,
    SummaryJson, status_for,
};

use arbor_core::FamilyRegistry;
use arbor_core::limits::DEFAULT_PENDING_TTL_SECS;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the family registry behind a single read/write
/// lock. Mutations are rare and not latency-critical, so one exclusive
/// lock over the whole graph is the policy; queries share the read side.
#[derive(Clone)]
pub struct AppState {
    /// The registry containing the graph and the confirmation ledger.
    pub registry: Arc<RwLock<FamilyRegistry>>,
}

impl AppState {
    /// Create new app state with a registry.
    #[must_use]
    pub fn new(registry: FamilyRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }
}

// =============================================================================
// ENVIRONMENT CONFIGURATION
// =============================================================================

/// Pending-link TTL from `ARBOR_PENDING_TTL_SECS`, default 30 days.
#[must_use]
pub fn get_pending_ttl_from_env() -> u64 {
    std::env::var("ARBOR_PENDING_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PENDING_TTL_SECS)
}

/// Expiry sweep period from `ARBOR_SWEEP_INTERVAL_SECS`, default hourly.
#[must_use]
pub fn get_sweep_interval_from_env() -> u64 {
    std::env::var("ARBOR_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600)
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `ARBOR_CORS_ORIGINS`:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("ARBOR_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (ARBOR_CORS_ORIGINS=*). This is insecure for production!"
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
                    "CORS: No valid origins in ARBOR_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No ARBOR_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit - bounds request payloads
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/people", post(handlers::register_handler))
        .route("/people", get(handlers::list_handler))
        .route("/people/{id}", put(handlers::update_handler))
        .route("/people/{id}", delete(handlers::delete_handler))
        .route("/people/{id}/family", post(handlers::family_handler))
        .route("/people/{id}/spouse", post(handlers::spouse_handler))
        .route("/people/{id}/confirm", post(handlers::confirm_handler))
        .route("/people/{id}/detach", post(handlers::detach_handler))
        .route("/people/{id}/tree", get(handlers::tree_handler))
        .route(
            "/people/by-name/{name}/tree",
            get(handlers::tree_by_name_handler),
        )
        .route(
            "/people/{id}/same-generation",
            get(handlers::same_generation_handler),
        )
        .route(
            "/people/{id}/pending-confirmations",
            get(handlers::pending_handler),
        )
        .route("/people/{id}/kinship", get(handlers::kinship_handler))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Spawn the periodic pending-link expiry sweep.
///
/// Runs under the same exclusive lock discipline as every other mutation.
/// A TTL of zero disables the sweep entirely.
fn spawn_expiry_sweep(state: &AppState) {
    let ttl = get_pending_ttl_from_env();
    if ttl == 0 {
        tracing::info!("Pending-link expiry disabled (ARBOR_PENDING_TTL_SECS=0)");
        return;
    }
    let period = get_sweep_interval_from_env().max(1);
    tracing::info!(
        "Pending-link expiry enabled: ttl {}s, sweep every {}s",
        ttl,
        period
    );

    let registry = Arc::clone(&state.registry);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let now = chrono::Utc::now().timestamp().max(0) as u64;
            let expired = registry.write().await.expire_stale(now);
            if expired > 0 {
                tracing::info!("Expired {} stale pending link(s)", expired);
            }
        }
    });
}

/// Start the HTTP server.
pub async fn run_server(addr: &str, registry: FamilyRegistry) -> anyhow::Result<()> {
    let state = AppState::new(registry);
    spawn_expiry_sweep(&state);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Arbor HTTP server listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
