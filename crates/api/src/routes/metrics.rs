//! Prometheus metrics endpoint.

use axum::Router;
use metrics_reporter::{MetricRegistry, endpoint};

/// Mounts the scrape endpoint on `path`.
///
/// A scrape is recorded after its body is rendered, so it shows up in the
/// next scrape.
pub fn routes(path: &str, registry: MetricRegistry) -> Router {
    tracing::debug!(%path, "mounting metrics endpoint");
    endpoint::routes(path, registry)
}
