//! One-shot build timestamp gauge.

use common::BuildInfo;

use crate::collectors::GaugeVec;
use crate::http::HttpMetrics;

/// Sets the `build_timestamp` series once at startup.
///
/// The reporter is consumed by [`BuildInfoReporter::report`], so the gauge
/// is set at most once per reporter.
#[derive(Debug)]
pub struct BuildInfoReporter {
    gauge: GaugeVec,
}

impl BuildInfoReporter {
    pub fn new(metrics: &HttpMetrics) -> Self {
        Self {
            gauge: metrics.build_timestamp().clone(),
        }
    }

    /// Sets the gauge labelled with the compiler version, release version and
    /// commit to the parsed build timestamp.
    ///
    /// A missing or non-numeric timestamp leaves the gauge unset and is not
    /// an error. Returns whether a series was set.
    pub fn report(self, info: &BuildInfo) -> bool {
        let Some(timestamp) = info.timestamp_secs() else {
            return false;
        };
        let labels = [
            info.rustc_version.as_str(),
            info.version.as_str(),
            info.commit.as_str(),
        ];
        match self.gauge.with_label_values(&labels) {
            Ok(series) => {
                series.set(timestamp);
                true
            }
            Err(_) => false,
        }
    }
}
