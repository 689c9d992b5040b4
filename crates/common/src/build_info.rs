use chrono::{DateTime, Utc};
use serde::Serialize;

/// Release metadata baked into the binary at compile time.
///
/// The build pipeline injects these compile-time environment variables:
/// - `BUILD_TIMESTAMP`: seconds since the Unix epoch, as a decimal string
/// - `RELEASE`: release version (default: the crate version)
/// - `COMMIT`: commit hash (default: `git rev-parse --short HEAD`, else `"unknown"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub build_timestamp: String,
    pub rustc_version: String,
}

impl BuildInfo {
    /// Reads the values captured when this crate was compiled.
    pub fn from_build_env() -> Self {
        Self {
            version: option_env!("RELEASE")
                .unwrap_or(env!("CARGO_PKG_VERSION"))
                .to_string(),
            commit: option_env!("COMMIT")
                .unwrap_or(env!("GIT_HASH"))
                .to_string(),
            build_timestamp: option_env!("BUILD_TIMESTAMP").unwrap_or_default().to_string(),
            rustc_version: rustc_version().to_string(),
        }
    }

    /// Creates build info for an explicit release, keeping the compiler version
    /// of the running binary.
    pub fn new(
        version: impl Into<String>,
        commit: impl Into<String>,
        build_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            commit: commit.into(),
            build_timestamp: build_timestamp.into(),
            rustc_version: rustc_version().to_string(),
        }
    }

    /// Parses the build timestamp as fractional seconds since the epoch.
    ///
    /// Returns `None` for empty, non-numeric, or non-finite values. Surrounding
    /// whitespace is not stripped.
    pub fn timestamp_secs(&self) -> Option<f64> {
        self.build_timestamp
            .parse::<f64>()
            .ok()
            .filter(|secs| secs.is_finite())
    }

    /// Returns the build time as a UTC datetime, if the timestamp parses.
    pub fn build_time(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp_secs()?;
        let whole = secs.floor();
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::<Utc>::from_timestamp(whole as i64, nanos)
    }
}

/// Version string of the compiler that built this binary.
pub fn rustc_version() -> &'static str {
    env!("RUSTC_VERSION")
}
