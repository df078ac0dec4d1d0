//! # Prometheus Metrics
//!
//! Request metrics recorded through the `metrics` facade:
//!
//! - `taxi_http_requests_total{method, path, status}` (counter)
//! - `taxi_http_request_duration_seconds{method, path}` (histogram)
//!
//! `path` is the route template (`/cars/{id}`), never the raw URI, so label
//! cardinality stays bounded. Without an installed recorder the macros are
//! no-ops. The binary installs `metrics-exporter-prometheus` and the render
//! handle is served at `/metrics`.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;

pub const REQUESTS_TOTAL: &str = "taxi_http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "taxi_http_request_duration_seconds";

/// Middleware that counts and times every request.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method,
        "path" => path
    )
    .record(started.elapsed().as_secs_f64());

    response
}

/// GET /metrics: Prometheus text exposition.
pub async fn render(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics are disabled".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use taxi_core::PasswordCost;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::with_config(AppConfig {
            password_cost: PasswordCost::minimal(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn render_without_recorder_is_not_found() {
        let app = Router::new()
            .route("/metrics", get(render))
            .with_state(state());
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn requests_are_counted_by_route_template() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let app = Router::new()
            .route("/cars/{id}", get(|| async { "ok" }))
            .layer(from_fn(metrics_middleware));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let request = Request::builder().uri("/cars/7").body(Body::empty()).unwrap();
        let status = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let response = app.oneshot(request).await.unwrap();
                let status = response.status();
                response.into_body().collect().await.unwrap();
                status
            })
        });
        assert_eq!(status, StatusCode::OK);

        let rendered = handle.render();
        assert!(rendered.contains(REQUESTS_TOTAL));
        assert!(rendered.contains(r#"path="/cars/{id}""#));
        assert!(rendered.contains(r#"status="200""#));
    }
}
