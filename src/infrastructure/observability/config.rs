//! Observability configuration

use serde::Deserialize;

use crate::infrastructure::publishers::DEFAULT_METRICS_PREFIX;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Install a global tracing subscriber on `ScientistConfig::install`
    #[serde(default)]
    pub install_subscriber: bool,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Prefix for every metric the metrics publisher records
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Install a global Prometheus recorder on `ScientistConfig::install`
    #[serde(default)]
    pub install_exporter: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_prefix() -> String {
    DEFAULT_METRICS_PREFIX.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            install_subscriber: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            install_exporter: false,
        }
    }
}
