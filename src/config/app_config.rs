use std::sync::Arc;

use serde::Deserialize;

use crate::domain::defaults::{set_default_enabled, set_default_publisher};
use crate::domain::publisher::Publisher;
use crate::infrastructure::observability::{
    init_metrics, init_tracing, LoggingConfig, MetricsConfig, PrometheusMetrics,
};
use crate::infrastructure::publishers::{
    CompositePublisher, LogPublisher, MetricsPublisher, NoopPublisher,
};

/// Publisher selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    Noop,
    Log,
    Metrics,
}

/// Process-wide experiment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScientistConfig {
    /// Default enablement for experiments without an explicit flag
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Publishers installed as the default publisher
    #[serde(default)]
    pub publishers: Vec<PublisherKind>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_enabled() -> bool {
    true
}

impl Default for ScientistConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            publishers: Vec::new(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ScientistConfig {
    /// Load from `config/scientist`, `config/scientist.local` and
    /// `SCIENTIST__*` environment variables, later sources winning
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/scientist").required(false))
            .add_source(config::File::with_name("config/scientist.local").required(false))
            .add_source(
                config::Environment::with_prefix("SCIENTIST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("publishers")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse an inline TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn publisher_for(&self, kind: PublisherKind) -> Arc<dyn Publisher> {
        match kind {
            PublisherKind::Noop => Arc::new(NoopPublisher::new()),
            PublisherKind::Log => Arc::new(LogPublisher::new()),
            PublisherKind::Metrics => Arc::new(MetricsPublisher::new(&self.metrics.prefix)),
        }
    }

    /// Build the configured publisher: noop when none, the publisher itself
    /// when one, a composite when several
    pub fn build_publisher(&self) -> Arc<dyn Publisher> {
        match self.publishers.as_slice() {
            [] => Arc::new(NoopPublisher::new()),
            [kind] => self.publisher_for(*kind),
            kinds => Arc::new(CompositePublisher::new(
                kinds.iter().map(|kind| self.publisher_for(*kind)).collect(),
            )),
        }
    }

    /// Write the process-wide defaults and bootstrap the requested
    /// observability. Returns the Prometheus handle when a recorder was
    /// installed.
    pub fn install(&self) -> Option<PrometheusMetrics> {
        if self.logging.install_subscriber {
            if let Err(e) = init_tracing(&self.logging) {
                tracing::warn!("Tracing subscriber not installed: {}", e);
            }
        }

        let metrics = if self.metrics.install_exporter {
            init_metrics(&self.metrics)
        } else {
            None
        };

        set_default_enabled(self.enabled);
        set_default_publisher(Some(self.build_publisher()));

        tracing::debug!(
            enabled = self.enabled,
            publishers = ?self.publishers,
            "Experiment defaults installed"
        );

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::defaults::{default_enabled as ambient_enabled, default_publisher};
    use crate::infrastructure::observability::LogFormat;

    #[test]
    fn test_defaults() {
        let config = ScientistConfig::default();

        assert!(config.enabled);
        assert!(config.publishers.is_empty());
        assert_eq!(config.metrics.prefix, "scientist");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_str() {
        let config = ScientistConfig::from_toml_str(
            r#"
            enabled = false
            publishers = ["log", "metrics"]

            [metrics]
            prefix = "shadow"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.publishers, vec![PublisherKind::Log, PublisherKind::Metrics]);
        assert_eq!(config.metrics.prefix, "shadow");
        assert!(!config.metrics.install_exporter);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ScientistConfig::from_toml_str("").unwrap();

        assert!(config.enabled);
        assert!(config.publishers.is_empty());
    }

    #[test]
    fn test_unknown_publisher_kind_is_rejected() {
        assert!(ScientistConfig::from_toml_str(r#"publishers = ["kafka"]"#).is_err());
    }

    #[test]
    fn test_build_publisher_accepts_results() {
        use std::time::Duration;

        use crate::domain::experiment::{ExperimentResult, Observation, Role};

        let result: ExperimentResult<i32, String> = ExperimentResult::new(
            "config",
            Observation::new(Role::Control, Ok(1), Duration::ZERO, Duration::ZERO),
            Observation::new(Role::Candidate, Ok(2), Duration::ZERO, Duration::ZERO),
            false,
        );

        for publishers in [
            vec![],
            vec![PublisherKind::Log],
            vec![PublisherKind::Noop, PublisherKind::Log, PublisherKind::Metrics],
        ] {
            let config = ScientistConfig {
                publishers,
                ..ScientistConfig::default()
            };

            assert!(config.build_publisher().publish(&result).is_ok());
        }
    }

    #[test]
    fn test_install_sets_process_defaults() {
        let config = ScientistConfig::from_toml_str(r#"publishers = ["noop"]"#).unwrap();

        assert!(config.install().is_none());
        assert!(ambient_enabled());
        assert!(default_publisher().is_some());
    }
}
