//! Publisher that writes results as structured `tracing` events

use tracing::{info, warn};

use crate::domain::experiment::Report;
use crate::domain::publisher::Publisher;

/// Logs every result under the `scientist` target.
///
/// Matches and ignored mismatches are logged at `INFO`, unexpected
/// mismatches at `WARN`. Without an installed subscriber nothing is emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl Publisher for LogPublisher {
    fn publish(&self, result: &dyn Report) -> anyhow::Result<()> {
        let control = result.control();
        let candidate = result.candidate();

        if result.matched() {
            info!(
                target: "scientist",
                experiment = %result.experiment(),
                control_duration = control.duration().as_secs_f64(),
                candidate_duration = candidate.duration().as_secs_f64(),
                "Experiment matched"
            );
        } else if result.ignored_mismatch() {
            info!(
                target: "scientist",
                experiment = %result.experiment(),
                control_value = %control.describe(),
                candidate_value = %candidate.describe(),
                "Experiment mismatched (ignored)"
            );
        } else {
            warn!(
                target: "scientist",
                experiment = %result.experiment(),
                control_value = %control.describe(),
                candidate_value = %candidate.describe(),
                control_duration = control.duration().as_secs_f64(),
                candidate_duration = candidate.duration().as_secs_f64(),
                control_raised = control.raised(),
                candidate_raised = candidate.raised(),
                "Experiment mismatched"
            );
        }

        Ok(())
    }
}
