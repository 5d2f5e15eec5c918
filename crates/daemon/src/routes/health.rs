// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// `GET /healthcheck` — never leaks a chain URL or the private key, only the
/// Reporter's current status label.
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.reporter.status_label().await;
    (StatusCode::OK, Json(HealthResponse { status }))
}
