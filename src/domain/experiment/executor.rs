//! Experiment executor - runs control and candidate, compares, publishes
//!
//! Flow of one run:
//! 1. Check enablement and the gate; if either says no, run the control alone
//! 2. Require both behaviors, then run before-run hooks
//! 3. Execute control and candidate in random order, capturing each
//! 4. Compare observations and apply ignore filters
//! 5. Publish the result (publisher failures are swallowed)
//! 6. Return the control's outcome, or a mismatch error when asked to

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace};

use super::entity::{BlockingFn, Behavior, Experiment, Hook};
use super::observation::{observe, observe_async, Failure, Observation, Role};
use super::order::ExecutionOrder;
use super::result::ExperimentResult;
use crate::domain::defaults::default_publisher;
use crate::domain::error::{ConfigurationError, ExperimentError};

/// Runs the cleanup action when dropped, including while unwinding
struct CleanupGuard<'a> {
    cleanup: Option<&'a Hook>,
}

impl<'a> CleanupGuard<'a> {
    fn new(cleanup: Option<&'a Hook>) -> Self {
        Self { cleanup }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup {
            let _ = panic::catch_unwind(AssertUnwindSafe(cleanup));
        }
    }
}

async fn observe_behavior<T, E>(role: Role, behavior: &Behavior<T, E>) -> Observation<T, E> {
    match behavior {
        Behavior::Blocking(f) => observe(role, f),
        Behavior::Suspending(f) => observe_async(role, f).await,
    }
}

impl<T, E> Experiment<T, E> {
    /// Whether this run should execute the candidate at all
    fn should_run_candidate(&self) -> bool {
        if !self.is_enabled() {
            debug!(experiment = %self.name, "Experiment disabled, running control only");
            return false;
        }

        if let Some(gate) = &self.gate {
            if !gate.allows() {
                debug!(experiment = %self.name, "Experiment gated out, running control only");
                return false;
            }
        }

        true
    }

    fn configuration_error(&self, reason: ConfigurationError) -> ExperimentError<T, E> {
        ExperimentError::configuration(self.name.clone(), reason)
    }

    fn required_behaviors(
        &self,
    ) -> Result<(&Behavior<T, E>, &Behavior<T, E>), ExperimentError<T, E>> {
        let control = self
            .control
            .as_ref()
            .ok_or_else(|| self.configuration_error(ConfigurationError::MissingControl))?;

        let candidate = self
            .candidate
            .as_ref()
            .ok_or_else(|| self.configuration_error(ConfigurationError::MissingCandidate))?;

        Ok((control, candidate))
    }

    fn blocking<'b>(
        &self,
        role: Role,
        behavior: &'b Behavior<T, E>,
    ) -> Result<&'b BlockingFn<T, E>, ExperimentError<T, E>> {
        match behavior {
            Behavior::Blocking(f) => Ok(f),
            Behavior::Suspending(_) => {
                Err(self.configuration_error(ConfigurationError::SuspendingBehavior(role)))
            }
        }
    }

    fn run_hooks(&self) -> Result<(), ExperimentError<T, E>> {
        for hook in &self.before_run {
            hook().map_err(ExperimentError::Hook)?;
        }

        Ok(())
    }

    fn compare_observations(&self, control: &Observation<T, E>, candidate: &Observation<T, E>) -> bool {
        match (control.outcome(), candidate.outcome()) {
            (Ok(control), Ok(candidate)) => self.comparator.compare(control, candidate),
            (Err(control), Err(candidate)) => control.same_kind(candidate),
            _ => false,
        }
    }

    fn build_result(
        &self,
        control: Observation<T, E>,
        candidate: Observation<T, E>,
    ) -> ExperimentResult<T, E> {
        let matched = self.compare_observations(&control, &candidate);
        let result = ExperimentResult::new(self.name.clone(), control, candidate, matched);

        if result.mismatched() && self.ignore_filters.iter().any(|filter| filter(&result)) {
            result.mark_ignored()
        } else {
            result
        }
    }
}

impl<T, E> Experiment<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn publish(&self, result: &ExperimentResult<T, E>) {
        let Some(publisher) = self.publisher.clone().or_else(default_publisher) else {
            return;
        };

        let _ = panic::catch_unwind(AssertUnwindSafe(|| publisher.publish(result)));
    }

    fn finish(
        &self,
        control: Observation<T, E>,
        candidate: Observation<T, E>,
    ) -> Result<T, ExperimentError<T, E>> {
        let result = self.build_result(control, candidate);

        self.publish(&result);

        if self.raise_on_mismatches && result.unexpected_mismatch() {
            return Err(ExperimentError::mismatch(result));
        }

        let (control, _) = result.into_observations();

        match control.into_outcome() {
            Ok(value) => Ok(value),
            Err(Failure::Error(error)) => Err(ExperimentError::Control(error)),
            Err(Failure::Panic(payload)) => payload.resume(),
        }
    }

    /// Run the experiment, returning the control's outcome.
    ///
    /// A control `Err` comes back as [`ExperimentError::Control`]; a
    /// control panic resumes unwinding with its original payload. The
    /// candidate's outcome never reaches the caller.
    pub fn run(&self) -> Result<T, ExperimentError<T, E>> {
        if !self.should_run_candidate() {
            return self.run_control_only();
        }

        let (control, candidate) = self.required_behaviors()?;
        let control = self.blocking(Role::Control, control)?;
        let candidate = self.blocking(Role::Candidate, candidate)?;

        let _cleanup = CleanupGuard::new(self.cleanup.as_ref());

        self.run_hooks()?;

        let order = self.order.next_order();
        trace!(experiment = %self.name, %order, "Running experiment behaviors");

        let (control, candidate) = match order {
            ExecutionOrder::ControlFirst => {
                let control = observe(Role::Control, control);
                let candidate = observe(Role::Candidate, candidate);
                (control, candidate)
            }
            ExecutionOrder::CandidateFirst => {
                let candidate = observe(Role::Candidate, candidate);
                let control = observe(Role::Control, control);
                (control, candidate)
            }
        };

        self.finish(control, candidate)
    }

    fn run_control_only(&self) -> Result<T, ExperimentError<T, E>> {
        let control = self
            .control
            .as_ref()
            .ok_or_else(|| self.configuration_error(ConfigurationError::MissingControl))?;

        let control = self.blocking(Role::Control, control)?;

        control().map_err(ExperimentError::Control)
    }
}

impl<T, E> Experiment<T, E>
where
    T: fmt::Debug + Send,
    E: fmt::Debug + Send,
{
    /// Async variant of [`Experiment::run`].
    ///
    /// Accepts both blocking and async behaviors. Control and candidate
    /// are awaited one after the other, never concurrently.
    pub async fn run_async(&self) -> Result<T, ExperimentError<T, E>> {
        if !self.should_run_candidate() {
            return self.run_control_only_async().await;
        }

        let (control, candidate) = self.required_behaviors()?;

        let _cleanup = CleanupGuard::new(self.cleanup.as_ref());

        self.run_hooks()?;

        let order = self.order.next_order();
        trace!(experiment = %self.name, %order, "Running experiment behaviors");

        let (control, candidate) = match order {
            ExecutionOrder::ControlFirst => {
                let control = observe_behavior(Role::Control, control).await;
                let candidate = observe_behavior(Role::Candidate, candidate).await;
                (control, candidate)
            }
            ExecutionOrder::CandidateFirst => {
                let candidate = observe_behavior(Role::Candidate, candidate).await;
                let control = observe_behavior(Role::Control, control).await;
                (control, candidate)
            }
        };

        self.finish(control, candidate)
    }

    async fn run_control_only_async(&self) -> Result<T, ExperimentError<T, E>> {
        match &self.control {
            None => Err(self.configuration_error(ConfigurationError::MissingControl)),
            Some(Behavior::Blocking(f)) => f().map_err(ExperimentError::Control),
            Some(Behavior::Suspending(f)) => f().await.map_err(ExperimentError::Control),
        }
    }
}
