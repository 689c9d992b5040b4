//! Process-wide metric registry backed by the Prometheus recorder.
//!
//! The recorder is built but never installed as the global `metrics`
//! recorder. Collectors hold a handle to the registry they were registered
//! with, so independent registries can coexist in one process.

use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};

use metrics::{Key, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::collectors::{CounterVec, GaugeVec, HistogramVec};
use crate::error::{MetricsError, Result};

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Kind of collector, as written on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    /// A histogram registered without buckets; the exporter renders quantiles.
    Summary,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

/// Name, help text and label schema of a registered collector.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: Vec<&'static str>,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    bucketed: Vec<&'static str>,
    descriptors: Mutex<Vec<MetricDescriptor>>,
}

/// Shared registry of named collectors.
///
/// Cloning is cheap; all clones observe and render the same state.
#[derive(Clone)]
pub struct MetricRegistry {
    inner: Arc<Inner>,
}

impl MetricRegistry {
    /// Creates a registry without custom histogram buckets.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self::from_recorder(recorder, Vec::new())
    }

    /// Returns a builder for a registry with per-metric histogram buckets.
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::default()
    }

    fn from_recorder(recorder: PrometheusRecorder, bucketed: Vec<&'static str>) -> Self {
        let handle = recorder.handle();
        Self {
            inner: Arc::new(Inner {
                recorder,
                handle,
                bucketed,
                descriptors: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers a counter family.
    pub fn register_counter(
        &self,
        name: &'static str,
        help: &'static str,
        labels: &[&'static str],
    ) -> Result<CounterVec> {
        self.register(name, help, MetricKind::Counter, labels)?;
        self.inner.recorder.describe_counter(name.into(), None, help.into());
        Ok(CounterVec::new(self.clone(), name, labels))
    }

    /// Registers a gauge family.
    pub fn register_gauge(
        &self,
        name: &'static str,
        help: &'static str,
        labels: &[&'static str],
    ) -> Result<GaugeVec> {
        self.register(name, help, MetricKind::Gauge, labels)?;
        self.inner.recorder.describe_gauge(name.into(), None, help.into());
        Ok(GaugeVec::new(self.clone(), name, labels))
    }

    /// Registers a histogram family.
    ///
    /// The histogram uses the buckets configured for `name` on the builder;
    /// without buckets the exporter renders it as a summary.
    pub fn register_histogram(
        &self,
        name: &'static str,
        help: &'static str,
        labels: &[&'static str],
    ) -> Result<HistogramVec> {
        let kind = if self.inner.bucketed.contains(&name) {
            MetricKind::Histogram
        } else {
            MetricKind::Summary
        };
        self.register(name, help, kind, labels)?;
        self.inner.recorder.describe_histogram(name.into(), None, help.into());
        Ok(HistogramVec::new(self.clone(), name, labels))
    }

    fn register(
        &self,
        name: &'static str,
        help: &'static str,
        kind: MetricKind,
        labels: &[&'static str],
    ) -> Result<()> {
        let mut descriptors = self
            .inner
            .descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if descriptors.iter().any(|d| d.name == name) {
            return Err(MetricsError::DuplicateMetric(name.to_string()));
        }
        descriptors.push(MetricDescriptor {
            name,
            help,
            kind,
            labels: labels.to_vec(),
        });
        tracing::debug!(metric = name, kind = kind.as_str(), "registered collector");
        Ok(())
    }

    /// Returns the descriptors of every registered collector, in registration order.
    pub fn descriptors(&self) -> Vec<MetricDescriptor> {
        self.inner
            .descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders all registered collectors in the Prometheus text format.
    ///
    /// Collectors without any series yet still get their `# HELP` and
    /// `# TYPE` lines, so every registered name is visible from startup.
    pub fn render(&self) -> String {
        let mut output = self.inner.handle.render();
        let descriptors = self
            .inner
            .descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for descriptor in descriptors.iter() {
            if has_type_line(&output, descriptor.name) {
                continue;
            }
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            let _ = writeln!(
                output,
                "# HELP {} {}",
                descriptor.name,
                escape_help(descriptor.help)
            );
            let _ = writeln!(output, "# TYPE {} {}", descriptor.name, descriptor.kind.as_str());
        }
        output
    }

    /// Drains buffered histogram samples into their buckets.
    pub fn run_upkeep(&self) {
        self.inner.handle.run_upkeep();
    }

    pub(crate) fn counter(&self, key: &Key) -> metrics::Counter {
        self.inner.recorder.register_counter(key, &METADATA)
    }

    pub(crate) fn gauge(&self, key: &Key) -> metrics::Gauge {
        self.inner.recorder.register_gauge(key, &METADATA)
    }

    pub(crate) fn histogram(&self, key: &Key) -> metrics::Histogram {
        self.inner.recorder.register_histogram(key, &METADATA)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("descriptors", &self.descriptors())
            .finish()
    }
}

/// Builder for [`MetricRegistry`].
#[derive(Debug, Default)]
pub struct MetricRegistryBuilder {
    buckets: Vec<(&'static str, Vec<f64>)>,
}

impl MetricRegistryBuilder {
    /// Sets fixed bucket boundaries for the histogram called `name`.
    pub fn buckets_for(mut self, name: &'static str, buckets: &[f64]) -> Self {
        self.buckets.push((name, buckets.to_vec()));
        self
    }

    /// Validates the bucket configuration and builds the registry.
    pub fn build(self) -> Result<MetricRegistry> {
        let mut builder = PrometheusBuilder::new();
        let mut bucketed = Vec::with_capacity(self.buckets.len());

        for (name, buckets) in &self.buckets {
            validate_buckets(name, buckets)?;
            builder = builder.set_buckets_for_metric(Matcher::Full(name.to_string()), buckets)?;
            bucketed.push(*name);
        }

        Ok(MetricRegistry::from_recorder(builder.build_recorder(), bucketed))
    }
}

fn validate_buckets(name: &str, buckets: &[f64]) -> Result<()> {
    let invalid = |reason: &str| MetricsError::InvalidBuckets {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if buckets.is_empty() {
        return Err(invalid("no buckets given"));
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err(invalid("bucket bounds must be finite"));
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("bucket bounds must be strictly increasing"));
    }
    Ok(())
}

fn has_type_line(output: &str, name: &str) -> bool {
    output.lines().any(|line| {
        line.strip_prefix("# TYPE ")
            .and_then(|rest| rest.split_whitespace().next())
            == Some(name)
    })
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
