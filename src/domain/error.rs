use std::fmt;

use thiserror::Error;

use super::experiment::{ExperimentResult, Role};

/// Experiment set up without the behaviors a run needs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Control behavior not set")]
    MissingControl,

    #[error("Candidate behavior not set")]
    MissingCandidate,

    #[error("The {0} behavior is async and can only run through run_async")]
    SuspendingBehavior(Role),
}

/// Unexpected mismatch, raised only when raise-on-mismatch is enabled
pub struct MismatchError<T, E> {
    result: ExperimentResult<T, E>,
}

impl<T, E> MismatchError<T, E> {
    pub fn new(result: ExperimentResult<T, E>) -> Self {
        Self { result }
    }

    /// The result that mismatched
    pub fn result(&self) -> &ExperimentResult<T, E> {
        &self.result
    }

    pub fn into_result(self) -> ExperimentResult<T, E> {
        self.result
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for MismatchError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MismatchError")
            .field("result", &self.result)
            .finish()
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for MismatchError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Experiment '{}' mismatched: control={}, candidate={}",
            self.result.experiment(),
            describe(self.result.control().outcome()),
            describe(self.result.candidate().outcome()),
        )
    }
}

impl<T: fmt::Debug, E: fmt::Debug> std::error::Error for MismatchError<T, E> {}

fn describe<T: fmt::Debug, E: fmt::Debug>(
    outcome: &Result<T, super::experiment::Failure<E>>,
) -> String {
    match outcome {
        Ok(value) => format!("{:?}", value),
        Err(failure) => failure.describe(),
    }
}

/// Errors a caller can observe from running an experiment
#[derive(Debug, Error)]
pub enum ExperimentError<T, E> {
    #[error("Experiment '{experiment}' is misconfigured: {reason}")]
    Configuration {
        experiment: String,
        reason: ConfigurationError,
    },

    /// The control's own error, unchanged
    #[error("Control behavior failed: {0}")]
    Control(E),

    #[error("Before-run hook failed: {0}")]
    Hook(anyhow::Error),

    #[error("{0}")]
    Mismatch(Box<MismatchError<T, E>>),
}

impl<T, E> ExperimentError<T, E> {
    pub fn configuration(experiment: impl Into<String>, reason: ConfigurationError) -> Self {
        Self::Configuration {
            experiment: experiment.into(),
            reason,
        }
    }

    pub fn mismatch(result: ExperimentResult<T, E>) -> Self {
        Self::Mismatch(Box::new(MismatchError::new(result)))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }

    /// The control's error, if that is what this is
    pub fn control_error(&self) -> Option<&E> {
        match self {
            Self::Control(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_control_error(self) -> Option<E> {
        match self {
            Self::Control(error) => Some(error),
            _ => None,
        }
    }

    /// The mismatched result, if raise-on-mismatch fired
    pub fn mismatch_result(&self) -> Option<&ExperimentResult<T, E>> {
        match self {
            Self::Mismatch(error) => Some(error.result()),
            _ => None,
        }
    }
}
