//! Observability infrastructure - tracing subscriber and Prometheus recorder

mod config;
mod metrics;
mod tracing_setup;

pub use self::config::{LogFormat, LoggingConfig, MetricsConfig};
pub use self::metrics::{init_metrics, PrometheusMetrics};
pub use self::tracing_setup::init_tracing;
