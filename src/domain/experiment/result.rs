//! Experiment result: the verdict of comparing two observations

use std::fmt;
use std::time::Duration;

use super::observation::{Observation, Role};

// ============================================================================
// ExperimentResult
// ============================================================================

/// Aggregates the control and candidate observations of one run
#[derive(Debug)]
pub struct ExperimentResult<T, E> {
    experiment: String,
    control: Observation<T, E>,
    candidate: Observation<T, E>,
    matched: bool,
    ignored: bool,
}

impl<T, E> ExperimentResult<T, E> {
    /// Create a result that has not been through the ignore filters
    pub fn new(
        experiment: impl Into<String>,
        control: Observation<T, E>,
        candidate: Observation<T, E>,
        matched: bool,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            control,
            candidate,
            matched,
            ignored: false,
        }
    }

    /// Mark a mismatch as suppressed. Has no effect on a matched result.
    pub fn mark_ignored(mut self) -> Self {
        self.ignored = self.mismatched();
        self
    }

    /// Name of the experiment that produced this result
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    pub fn control(&self) -> &Observation<T, E> {
        &self.control
    }

    pub fn candidate(&self) -> &Observation<T, E> {
        &self.candidate
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Whether a mismatch was suppressed by an ignore filter
    pub fn ignored(&self) -> bool {
        self.ignored
    }

    pub fn mismatched(&self) -> bool {
        !self.matched
    }

    pub fn ignored_mismatch(&self) -> bool {
        self.mismatched() && self.ignored
    }

    pub fn unexpected_mismatch(&self) -> bool {
        self.mismatched() && !self.ignored
    }

    /// Split the result back into its observations
    pub fn into_observations(self) -> (Observation<T, E>, Observation<T, E>) {
        (self.control, self.candidate)
    }
}

// ============================================================================
// Type-erased views for publishers
// ============================================================================

/// Read-only view of one observation, independent of its value type
pub trait ObservationReport {
    fn role(&self) -> Role;

    fn duration(&self) -> Duration;

    fn cpu_time(&self) -> Duration;

    /// Whether the behavior failed
    fn raised(&self) -> bool;

    /// Debug rendering of the value, or of the failure
    fn describe(&self) -> String;
}

impl<T: fmt::Debug, E: fmt::Debug> ObservationReport for Observation<T, E> {
    fn role(&self) -> Role {
        Observation::role(self)
    }

    fn duration(&self) -> Duration {
        Observation::duration(self)
    }

    fn cpu_time(&self) -> Duration {
        Observation::cpu_time(self)
    }

    fn raised(&self) -> bool {
        self.failed()
    }

    fn describe(&self) -> String {
        match self.outcome() {
            Ok(value) => format!("{:?}", value),
            Err(failure) => failure.describe(),
        }
    }
}

/// Read-only view of a finished result, handed to publishers
pub trait Report {
    fn experiment(&self) -> &str;

    fn matched(&self) -> bool;

    fn ignored(&self) -> bool;

    fn control(&self) -> &dyn ObservationReport;

    fn candidate(&self) -> &dyn ObservationReport;

    fn mismatched(&self) -> bool {
        !self.matched()
    }

    fn ignored_mismatch(&self) -> bool {
        self.mismatched() && self.ignored()
    }

    fn unexpected_mismatch(&self) -> bool {
        self.mismatched() && !self.ignored()
    }
}

impl<T: fmt::Debug, E: fmt::Debug> Report for ExperimentResult<T, E> {
    fn experiment(&self) -> &str {
        &self.experiment
    }

    fn matched(&self) -> bool {
        self.matched
    }

    fn ignored(&self) -> bool {
        self.ignored
    }

    fn control(&self) -> &dyn ObservationReport {
        &self.control
    }

    fn candidate(&self) -> &dyn ObservationReport {
        &self.candidate
    }
}
