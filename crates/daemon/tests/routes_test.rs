// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the `/healthcheck` and `/metrics` routes, exercised
//! through the full Axum router rather than calling the handlers directly.

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use oracle_daemon::app::create_app;
    use oracle_daemon::reporter::ReporterHandle;
    use oracle_daemon::state::AppState;
    use tower::ServiceExt;

    async fn send(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[tokio::test]
    async fn healthcheck_reports_default_not_working_status() {
        let handle = ReporterHandle::new();
        let app = create_app(AppState::new(handle));

        let (status, body) = send(app, "/healthcheck").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("not working"));
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_prometheus_text() {
        oracle_daemon::metrics::init();
        let handle = ReporterHandle::new();
        let app = create_app(AppState::new(handle));

        let (status, body) = send(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("oracle_"));
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let handle = ReporterHandle::new();
        let app = create_app(AppState::new(handle));

        let (status, _) = send(app, "/nonexistent").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
