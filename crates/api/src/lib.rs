//! HTTP service with request metrics and a Prometheus scrape endpoint.
//!
//! Serves a root handler, liveness and readiness probes, build information,
//! and the registry on the configured metrics path. Every route, the scrape
//! endpoint included, is instrumented into [`HttpMetrics`].

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::routing::get;
use common::BuildInfo;
use metrics_reporter::HttpMetrics;
use metrics_reporter::instrumentation::instrument;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
#[derive(Debug)]
pub struct AppState {
    pub build_info: BuildInfo,
    ready: AtomicBool,
}

impl AppState {
    /// Creates state that reports not ready until [`AppState::set_ready`] is called.
    pub fn new(build_info: BuildInfo) -> Self {
        Self {
            build_info,
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics: HttpMetrics, metrics_path: &str) -> Router {
    let registry = metrics.registry_handle().clone();

    let service = Router::new()
        .route("/", get(routes::root::index))
        .route("/healthz", get(routes::health::check))
        .route("/readyz", get(routes::health::ready))
        .route("/info", get(routes::info::get))
        .fallback(routes::root::not_found)
        .with_state(state);

    let app = service.merge(routes::metrics::routes(metrics_path, registry));

    instrument(app, metrics)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
