//! Built-in publishers for experiment results

mod composite;
mod log;
mod metrics;
mod noop;

pub use self::composite::CompositePublisher;
pub use self::log::LogPublisher;
pub use self::metrics::{MetricsPublisher, DEFAULT_METRICS_PREFIX, MISMATCH_EVENT};
pub use self::noop::NoopPublisher;
