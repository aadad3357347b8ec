//! Publisher that records results as metrics and span events
//!
//! Metrics go through the `metrics` facade, so they land in whatever
//! recorder is installed (see `observability::init_metrics`). Unexpected
//! mismatches are also attached to the active OpenTelemetry span.

use metrics::{counter, histogram};
use opentelemetry::trace::get_active_span;
use opentelemetry::KeyValue;

use crate::domain::experiment::{ObservationReport, Report};
use crate::domain::publisher::Publisher;

/// Default metric name prefix
pub const DEFAULT_METRICS_PREFIX: &str = "scientist";

/// Name of the span event added on unexpected mismatches
pub const MISMATCH_EVENT: &str = "scientist.mismatch";

/// Records experiment counters, durations and mismatch span events
#[derive(Debug, Clone)]
pub struct MetricsPublisher {
    total: String,
    mismatches: String,
    duration: String,
}

impl MetricsPublisher {
    pub fn new(prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref();

        Self {
            total: format!("{}_experiment_total", prefix),
            mismatches: format!("{}_experiment_mismatches_total", prefix),
            duration: format!("{}_experiment_duration_seconds", prefix),
        }
    }

    fn record_duration(&self, experiment: &str, observation: &dyn ObservationReport) {
        let labels = [
            ("experiment", experiment.to_string()),
            ("behavior", observation.role().to_string()),
        ];

        histogram!(self.duration.clone(), &labels).record(observation.duration().as_secs_f64());
    }
}

impl Default for MetricsPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_PREFIX)
    }
}

impl Publisher for MetricsPublisher {
    fn publish(&self, result: &dyn Report) -> anyhow::Result<()> {
        let experiment = result.experiment();
        let labels = [
            ("experiment", experiment.to_string()),
            ("matched", result.matched().to_string()),
            ("ignored", result.ignored().to_string()),
        ];

        counter!(self.total.clone(), &labels).increment(1);

        if result.unexpected_mismatch() {
            let labels = [("experiment", experiment.to_string())];
            counter!(self.mismatches.clone(), &labels).increment(1);
        }

        self.record_duration(experiment, result.control());
        self.record_duration(experiment, result.candidate());

        if result.unexpected_mismatch() {
            annotate_active_span(result);
        }

        Ok(())
    }
}

fn annotate_active_span(result: &dyn Report) {
    get_active_span(|span| {
        if !span.is_recording() {
            return;
        }

        span.add_event(
            MISMATCH_EVENT,
            vec![
                KeyValue::new("experiment", result.experiment().to_string()),
                KeyValue::new("control.value", result.control().describe()),
                KeyValue::new("candidate.value", result.candidate().describe()),
                KeyValue::new("control.raised", result.control().raised()),
                KeyValue::new("candidate.raised", result.candidate().raised()),
            ],
        );
    });
}
