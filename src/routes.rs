//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /redirect`    - Tracked email click redirect (public)
//! - `GET  /health`      - Health check: DB, event store, open queue (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Message context** - Resolves `ec_message_id` before the redirect handler
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{message_context, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The message-context middleware is attached as a route layer so it only
/// runs for `/redirect`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let tracking = Router::new()
        .route("/redirect", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            message_context::layer,
        ));

    let router = Router::new()
        .merge(tracking)
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
