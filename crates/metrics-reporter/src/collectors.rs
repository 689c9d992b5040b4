//! Labelled collector families.
//!
//! Each family resolves a list of label values, given in the order of its
//! label names, to a single series handle from the `metrics` crate. The
//! handles are atomic and can be cached or resolved per observation.

use std::sync::Arc;

use metrics::{Counter, Gauge, Histogram, Key, Label};

use crate::error::{MetricsError, Result};
use crate::registry::MetricRegistry;

#[derive(Clone)]
struct Schema {
    registry: MetricRegistry,
    name: &'static str,
    labels: Arc<[&'static str]>,
}

impl Schema {
    fn new(registry: MetricRegistry, name: &'static str, labels: &[&'static str]) -> Self {
        Self {
            registry,
            name,
            labels: labels.into(),
        }
    }

    fn key(&self, values: &[&str]) -> Result<Key> {
        if values.len() != self.labels.len() {
            return Err(MetricsError::LabelCardinality {
                name: self.name.to_string(),
                expected: self.labels.len(),
                actual: values.len(),
            });
        }
        let labels: Vec<Label> = self
            .labels
            .iter()
            .zip(values)
            .map(|(name, value)| Label::new(*name, value.to_string()))
            .collect();
        Ok(Key::from_parts(self.name, labels))
    }
}

macro_rules! collector_family {
    ($(#[$doc:meta])* $family:ident, $handle:ty, $resolve:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $family {
            schema: Schema,
        }

        impl $family {
            pub(crate) fn new(
                registry: MetricRegistry,
                name: &'static str,
                labels: &[&'static str],
            ) -> Self {
                Self {
                    schema: Schema::new(registry, name, labels),
                }
            }

            /// Returns the series for the given label values.
            pub fn with_label_values(&self, values: &[&str]) -> Result<$handle> {
                let key = self.schema.key(values)?;
                Ok(self.schema.registry.$resolve(&key))
            }
        }

        impl std::fmt::Debug for $family {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($family))
                    .field("name", &self.schema.name)
                    .field("labels", &self.schema.labels)
                    .finish()
            }
        }
    };
}

collector_family!(
    /// Family of monotonically increasing counters.
    CounterVec,
    Counter,
    counter
);

collector_family!(
    /// Family of gauges that can be set to arbitrary values.
    GaugeVec,
    Gauge,
    gauge
);

collector_family!(
    /// Family of histograms with buckets fixed at registry construction.
    HistogramVec,
    Histogram,
    histogram
);
