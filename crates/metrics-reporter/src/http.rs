//! The HTTP request and build metrics exposed by the service.

use std::str::FromStr;
use std::time::Duration;

use axum::http::StatusCode;

use crate::collectors::{CounterVec, GaugeVec, HistogramVec};
use crate::error::{MetricsError, Result};
use crate::registry::MetricRegistry;

pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const BUILD_TIMESTAMP: &str = "build_timestamp";

/// Bucket boundaries of the request duration histogram, in seconds.
pub const DURATION_BUCKETS: [f64; 13] = [
    0.0001, 0.001, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Label carrying the compiler version on the build gauge. The name is kept
/// stable for existing dashboards.
pub const RUNTIME_VERSION_LABEL: &str = "go_version";

/// How a response status is turned into the `status` label value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLabel {
    /// Exact code, e.g. `"200"`.
    #[default]
    Code,
    /// Status class, e.g. `"2xx"`.
    Class,
}

impl StatusLabel {
    pub fn label(&self, status: StatusCode) -> String {
        match self {
            StatusLabel::Code => status.as_str().to_string(),
            StatusLabel::Class => format!("{}xx", status.as_u16() / 100),
        }
    }
}

impl FromStr for StatusLabel {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(StatusLabel::Code),
            "class" => Ok(StatusLabel::Class),
            other => Err(MetricsError::UnknownStatusLabel(other.to_string())),
        }
    }
}

/// Request duration histogram, request counter and build timestamp gauge,
/// registered together against one registry.
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    registry: MetricRegistry,
    duration: HistogramVec,
    requests: CounterVec,
    build_timestamp: GaugeVec,
    status_label: StatusLabel,
}

impl HttpMetrics {
    /// Builds a registry configured with [`DURATION_BUCKETS`] for the
    /// request duration histogram.
    pub fn registry() -> Result<MetricRegistry> {
        MetricRegistry::builder()
            .buckets_for(REQUEST_DURATION_SECONDS, &DURATION_BUCKETS)
            .build()
    }

    /// Registers all three collectors.
    ///
    /// Fails if any of the names is already taken in `registry`.
    pub fn register(registry: &MetricRegistry, status_label: StatusLabel) -> Result<Self> {
        let duration = registry.register_histogram(
            REQUEST_DURATION_SECONDS,
            "Histogram of http requests duration in seconds.",
            &["status"],
        )?;
        let requests = registry.register_counter(
            REQUESTS_TOTAL,
            "Total number of http requests.",
            &["status"],
        )?;
        let build_timestamp = registry.register_gauge(
            BUILD_TIMESTAMP,
            "Build timestamp with additional info.",
            &[RUNTIME_VERSION_LABEL, "version", "commit"],
        )?;

        Ok(Self {
            registry: registry.clone(),
            duration,
            requests,
            build_timestamp,
            status_label,
        })
    }

    /// Records one completed request.
    pub fn observe(&self, status: StatusCode, elapsed: Duration) {
        let status = self.status_label.label(status);
        let values = [status.as_str()];

        match (
            self.duration.with_label_values(&values),
            self.requests.with_label_values(&values),
        ) {
            (Ok(duration), Ok(requests)) => {
                duration.record(elapsed.as_secs_f64());
                requests.increment(1);
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "dropping request observation");
            }
        }
    }

    pub fn registry_handle(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn build_timestamp(&self) -> &GaugeVec {
        &self.build_timestamp
    }

    pub fn status_label(&self) -> StatusLabel {
        self.status_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(status_label: StatusLabel) -> HttpMetrics {
        let registry = HttpMetrics::registry().unwrap();
        HttpMetrics::register(&registry, status_label).unwrap()
    }

    #[test]
    fn status_label_granularity() {
        assert_eq!(StatusLabel::Code.label(StatusCode::OK), "200");
        assert_eq!(StatusLabel::Code.label(StatusCode::NOT_FOUND), "404");
        assert_eq!(StatusLabel::Class.label(StatusCode::OK), "2xx");
        assert_eq!(StatusLabel::Class.label(StatusCode::SERVICE_UNAVAILABLE), "5xx");
    }

    #[test]
    fn registered_metrics_keep_their_granularity() {
        assert_eq!(metrics(StatusLabel::Code).status_label(), StatusLabel::Code);
        assert_eq!(metrics(StatusLabel::Class).status_label(), StatusLabel::Class);
    }

    #[test]
    fn status_label_parses_from_config() {
        assert_eq!("code".parse::<StatusLabel>().unwrap(), StatusLabel::Code);
        assert_eq!(" Class ".parse::<StatusLabel>().unwrap(), StatusLabel::Class);
        assert!(matches!(
            "exact".parse::<StatusLabel>(),
            Err(MetricsError::UnknownStatusLabel(_))
        ));
    }

    #[test]
    fn names_are_visible_before_any_request() {
        let metrics = metrics(StatusLabel::Code);
        let body = metrics.registry_handle().render();

        assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(body.contains("# TYPE http_requests_total counter"));
        assert!(body.contains("# TYPE build_timestamp gauge"));
    }

    #[test]
    fn counts_every_observed_request() {
        let metrics = metrics(StatusLabel::Code);
        for _ in 0..5 {
            metrics.observe(StatusCode::OK, Duration::from_millis(3));
        }
        metrics.observe(StatusCode::NOT_FOUND, Duration::from_millis(3));

        let body = metrics.registry_handle().render();
        assert!(body.contains("http_requests_total{status=\"200\"} 5"));
        assert!(body.contains("http_requests_total{status=\"404\"} 1"));
        assert!(body.contains("http_request_duration_seconds_count{status=\"200\"} 5"));
    }

    #[test]
    fn sub_millisecond_request_lands_in_millisecond_bucket() {
        let metrics = metrics(StatusLabel::Code);
        metrics.observe(StatusCode::OK, Duration::from_micros(500));

        let body = metrics.registry_handle().render();
        assert!(body.contains("http_request_duration_seconds_bucket{status=\"200\",le=\"0.0001\"} 0"));
        assert!(body.contains("http_request_duration_seconds_bucket{status=\"200\",le=\"0.001\"} 1"));
        assert!(body.contains("http_request_duration_seconds_bucket{status=\"200\",le=\"+Inf\"} 1"));
    }

    #[test]
    fn class_labels_are_shared_by_histogram_and_counter() {
        let metrics = metrics(StatusLabel::Class);
        metrics.observe(StatusCode::OK, Duration::from_millis(1));
        metrics.observe(StatusCode::CREATED, Duration::from_millis(1));

        let body = metrics.registry_handle().render();
        assert!(body.contains("http_requests_total{status=\"2xx\"} 2"));
        assert!(body.contains("http_request_duration_seconds_count{status=\"2xx\"} 2"));
        assert!(!body.contains("status=\"200\""));
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = HttpMetrics::registry().unwrap();
        HttpMetrics::register(&registry, StatusLabel::Code).unwrap();

        let err = HttpMetrics::register(&registry, StatusLabel::Code).unwrap_err();
        assert!(matches!(err, MetricsError::DuplicateMetric(name) if name == REQUEST_DURATION_SECONDS));
    }

    #[test]
    fn duration_buckets_are_increasing() {
        assert!(DURATION_BUCKETS.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
