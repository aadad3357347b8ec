//! Infrastructure layer - concrete publishers and observability bootstrap

pub mod observability;
pub mod publishers;

pub use observability::{init_metrics, init_tracing, LogFormat, LoggingConfig, MetricsConfig};
pub use publishers::{CompositePublisher, LogPublisher, MetricsPublisher, NoopPublisher};
