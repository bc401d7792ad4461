//! axum routes.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use cloudscrape_engine::prometheus::CONTENT_TYPE as PROMETHEUS_CONTENT_TYPE;

use crate::exporter::Exporter;

const HOME_PAGE: &str = "<html>\n\
<head><title>CloudWatch Exporter</title></head>\n\
<body>\n\
<h1>CloudWatch Exporter</h1>\n\
<p><a href=\"/metrics\">Metrics</a></p>\n\
</body>\n\
</html>\n";

pub fn build_router(exporter: Arc<Exporter>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/metrics", get(metrics))
        .route("/-/reload", get(reload_not_allowed).post(reload))
        .with_state(exporter)
}

/// GET /
async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// GET /metrics
async fn metrics(State(exporter): State<Arc<Exporter>>) -> impl IntoResponse {
    let body = exporter.render_metrics().await;
    (StatusCode::OK, [(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body)
}

/// POST /-/reload
async fn reload(State(exporter): State<Arc<Exporter>>) -> impl IntoResponse {
    match exporter.reload().await {
        Ok(()) => (StatusCode::OK, "OK".to_string()),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")),
    }
}

/// GET /-/reload
async fn reload_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Only POST requests allowed")
}
