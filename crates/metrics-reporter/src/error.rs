//! Metrics reporter error types.

use thiserror::Error;

/// Errors raised while building the registry or registering collectors.
///
/// All of these indicate a programming error and are expected to abort
/// startup rather than be handled at runtime.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A collector with the same name is already registered.
    #[error("Metric already registered: {0}")]
    DuplicateMetric(String),

    /// Histogram buckets are empty, non-finite, or not strictly increasing.
    #[error("Invalid buckets for {name}: {reason}")]
    InvalidBuckets { name: String, reason: String },

    /// The number of label values does not match the collector's label names.
    #[error("Metric {name} expects {expected} label values, got {actual}")]
    LabelCardinality {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A status label granularity string was not recognised.
    #[error("Unknown status label granularity: {0}")]
    UnknownStatusLabel(String),

    /// The Prometheus exporter rejected its configuration.
    #[error("Exporter error: {0}")]
    Exporter(#[from] metrics_exporter_prometheus::BuildError),
}

/// Result type for metrics reporter operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
