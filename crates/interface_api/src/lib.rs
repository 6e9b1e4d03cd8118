//! HTTP API Layer
//!
//! This crate exposes the policy store over a small REST API using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for policies and health checks
//! - **Middleware**: Request ids and request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//! - **Config**: `POLICY_*` environment configuration for the server binary
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(store, repository));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod shutdown;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_policy::{PolicyRepository, PolicyStore};

use crate::handlers::{health, policy};
use crate::middleware::{request_logging, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PolicyStore>,
    /// Same repository the store writes to, kept for readiness checks
    pub repository: Arc<dyn PolicyRepository>,
}

impl AppState {
    pub fn new(store: Arc<PolicyStore>, repository: Arc<dyn PolicyRepository>) -> Self {
        Self { store, repository }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Policy routes
    let policy_routes = Router::new()
        .route("/", get(policy::list_policies).post(policy::create_policy))
        .route("/stats", get(policy::get_stats))
        .route("/alerts", get(policy::get_alerts))
        .route(
            "/:id",
            get(policy::get_policy)
                .patch(policy::update_policy)
                .delete(policy::delete_policy),
        );

    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .layer(axum_middleware::from_fn(request_logging));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
