//! Prometheus metrics for an HTTP service.
//!
//! This crate provides:
//! - [`MetricRegistry`], a registry of named collectors rendered in the
//!   Prometheus text format
//! - [`HttpMetrics`], the request duration histogram, request counter and
//!   build timestamp gauge
//! - [`BuildInfoReporter`] to set the build gauge once at startup
//! - [`endpoint`], the `/metrics` scrape handler
//! - [`instrumentation`], middleware recording every request

pub mod build_info;
pub mod collectors;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod instrumentation;
pub mod registry;

pub use build_info::BuildInfoReporter;
pub use collectors::{CounterVec, GaugeVec, HistogramVec};
pub use error::{MetricsError, Result};
pub use http::{HttpMetrics, StatusLabel};
pub use registry::{MetricDescriptor, MetricKind, MetricRegistry, MetricRegistryBuilder};
