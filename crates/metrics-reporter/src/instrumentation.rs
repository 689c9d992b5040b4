//! Request instrumentation middleware.

use std::time::Instant;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;

use crate::http::HttpMetrics;

/// Times the inner service and records the outcome into `metrics`.
///
/// Install with `axum::middleware::from_fn_with_state(metrics, track)` or
/// [`instrument`].
pub async fn track(State(metrics): State<HttpMetrics>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics.observe(response.status(), start.elapsed());
    response
}

/// Wraps every route currently in `router` with [`track`].
///
/// Routes merged after this call are not instrumented.
pub fn instrument<S>(router: Router<S>, metrics: HttpMetrics) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(metrics, track))
}
