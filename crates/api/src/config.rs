//! Application configuration loaded from environment variables.

use std::time::Duration;

use metrics_reporter::StatusLabel;

/// Paths served by the service routes; the scrape endpoint may not shadow them.
pub const RESERVED_PATHS: [&str; 4] = ["/", "/healthz", "/readyz", "/info"];

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `METRICS_PATH`: scrape path (default: `"/metrics"`); must be a literal
///   path that is not one of [`RESERVED_PATHS`]
/// - `METRICS_STATUS_LABEL`: `code` or `class` (default: `code`)
/// - `METRICS_UPKEEP_SECS`: histogram upkeep period (default: `5`)
///
/// Values that fail to parse fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub metrics_path: String,
    pub status_label: StatusLabel,
    pub upkeep_interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            metrics_path: lookup("METRICS_PATH")
                .filter(|path| is_valid_metrics_path(path))
                .unwrap_or(defaults.metrics_path),
            status_label: lookup("METRICS_STATUS_LABEL")
                .and_then(|label| label.parse().ok())
                .unwrap_or(defaults.status_label),
            upkeep_interval: lookup("METRICS_UPKEEP_SECS")
                .and_then(|secs| secs.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.upkeep_interval),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_valid_metrics_path(path: &str) -> bool {
    path.starts_with('/')
        && !RESERVED_PATHS.contains(&path)
        && !path.contains([':', '{', '}', '*'])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            metrics_path: "/metrics".to_string(),
            status_label: StatusLabel::Code,
            upkeep_interval: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.status_label, StatusLabel::Code);
        assert_eq!(config.upkeep_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("RUST_LOG", "debug"),
            ("METRICS_PATH", "/internal/metrics"),
            ("METRICS_STATUS_LABEL", "class"),
            ("METRICS_UPKEEP_SECS", "30"),
        ]);
        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.metrics_path, "/internal/metrics");
        assert_eq!(config.status_label, StatusLabel::Class);
        assert_eq!(config.upkeep_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            ("PORT", "http"),
            ("METRICS_PATH", "metrics"),
            ("METRICS_STATUS_LABEL", "exact"),
            ("METRICS_UPKEEP_SECS", "0"),
        ]);
        let defaults = Config::default();
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.metrics_path, defaults.metrics_path);
        assert_eq!(config.status_label, defaults.status_label);
        assert_eq!(config.upkeep_interval, defaults.upkeep_interval);

        for path in [
            "/",
            "/healthz",
            "/readyz",
            "/info",
            "/:id",
            "/{id}",
            "/metrics/{*rest}",
            "/*",
        ] {
            let config = from_pairs(&[("METRICS_PATH", path)]);
            assert_eq!(config.metrics_path, defaults.metrics_path, "{path}");
        }
    }

    #[test]
    fn test_nested_metrics_path_is_accepted() {
        let config = from_pairs(&[("METRICS_PATH", "/internal/prometheus")]);
        assert_eq!(config.metrics_path, "/internal/prometheus");
    }
}
