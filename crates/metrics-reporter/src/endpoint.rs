//! Prometheus scrape endpoint.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::any;

use crate::registry::MetricRegistry;

/// Content type of the Prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Returns the current state of every registered collector.
///
/// Always answers `200 OK`; an empty registry yields an empty body.
pub async fn render(State(registry): State<MetricRegistry>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        registry.render(),
    )
}

/// Mounts [`render`] on `path` for any method.
pub fn routes(path: &str, registry: MetricRegistry) -> Router {
    Router::new().route(path, any(render)).with_state(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn scrape(app: Router, method: &str) -> (StatusCode, String, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn empty_registry_still_answers_ok() {
        let (status, content_type, body) =
            scrape(routes("/metrics", MetricRegistry::new()), "GET").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, CONTENT_TYPE);
        assert!(body.trim().is_empty());
    }

    #[tokio::test]
    async fn any_method_is_served() {
        let registry = MetricRegistry::new();
        registry.register_counter("jobs_total", "Jobs.", &[]).unwrap();

        let (status, _, body) = scrape(routes("/metrics", registry), "POST").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# TYPE jobs_total counter"));
    }

    #[tokio::test]
    async fn scraping_does_not_change_values() {
        let registry = MetricRegistry::new();
        registry
            .register_counter("jobs_total", "Jobs.", &[])
            .unwrap()
            .with_label_values(&[])
            .unwrap()
            .increment(7);
        let app = routes("/metrics", registry);

        let (_, _, first) = scrape(app.clone(), "GET").await;
        let (_, _, second) = scrape(app, "GET").await;

        assert!(first.contains("jobs_total 7"));
        assert_eq!(first, second);
    }
}
