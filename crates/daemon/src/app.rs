// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::logging::http_logger_middleware;
use crate::routes;
use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the two-route HTTP surface: `/healthcheck` and `/metrics`, both
/// served from one Axum router bound to `REST_API_SERVER_PORT`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(routes::health::get_health))
        .route("/metrics", get(routes::metrics::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(http_logger_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
