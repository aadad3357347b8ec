//! Observation of a single behavior execution
//!
//! Captures what one behavior produced (a value, an error, or a panic)
//! together with its wall-clock and process CPU time. Capturing never
//! panics and never propagates the behavior's failure.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use futures::FutureExt;

// ============================================================================
// Role
// ============================================================================

/// Which side of the experiment a behavior belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The established behavior whose outcome is returned to the caller
    Control,
    /// The behavior under evaluation
    Candidate,
}

impl Role {
    /// Get the role as a label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Failure
// ============================================================================

/// Payload of a captured panic
pub struct PanicPayload(Box<dyn Any + Send + 'static>);

impl PanicPayload {
    pub(crate) fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self(payload)
    }

    /// Panic message, when the payload is a string
    pub fn message(&self) -> &str {
        if let Some(message) = self.0.downcast_ref::<&'static str>() {
            message
        } else if let Some(message) = self.0.downcast_ref::<String>() {
            message.as_str()
        } else {
            "Box<dyn Any>"
        }
    }

    /// Unwrap the original payload
    pub fn into_inner(self) -> Box<dyn Any + Send + 'static> {
        self.0
    }

    /// Continue unwinding with the original payload
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.0)
    }
}

impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanicPayload").field(&self.message()).finish()
    }
}

/// Failure captured from a behavior
#[derive(Debug)]
pub enum Failure<E> {
    /// The behavior returned `Err`
    Error(E),
    /// The behavior panicked
    Panic(PanicPayload),
}

impl<E> Failure<E> {
    /// Whether two failures are of the same kind.
    ///
    /// Errors compare by enum variant only, never by payload. Any two
    /// panics share a kind; an error and a panic never do.
    pub fn same_kind(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Error(a), Self::Error(b)) => std::mem::discriminant(a) == std::mem::discriminant(b),
            (Self::Panic(_), Self::Panic(_)) => true,
            _ => false,
        }
    }

    /// Check if this failure is a panic
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }

    /// Get the returned error, if the behavior did not panic
    pub fn as_error(&self) -> Option<&E> {
        match self {
            Self::Error(error) => Some(error),
            Self::Panic(_) => None,
        }
    }
}

impl<E: fmt::Debug> Failure<E> {
    /// Render the failure for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Error(error) => format!("{:?}", error),
            Self::Panic(payload) => format!("panic: {}", payload.message()),
        }
    }
}

// ============================================================================
// Observation
// ============================================================================

/// Outcome and timing of one behavior execution
#[derive(Debug)]
pub struct Observation<T, E> {
    role: Role,
    outcome: Result<T, Failure<E>>,
    duration: Duration,
    cpu_time: Duration,
}

impl<T, E> Observation<T, E> {
    /// Create an observation from an already known outcome
    pub fn new(
        role: Role,
        outcome: Result<T, Failure<E>>,
        duration: Duration,
        cpu_time: Duration,
    ) -> Self {
        Self {
            role,
            outcome,
            duration,
            cpu_time,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returned value, if the behavior succeeded
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// Captured failure, if the behavior failed
    pub fn failure(&self) -> Option<&Failure<E>> {
        self.outcome.as_ref().err()
    }

    /// Check if the behavior failed
    pub fn failed(&self) -> bool {
        self.outcome.is_err()
    }

    /// Wall-clock execution time
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Process CPU time spent while the behavior ran.
    ///
    /// Read from `CLOCK_PROCESS_CPUTIME_ID` on unix, so it includes CPU used
    /// by other threads of the process over the same interval. Always
    /// `Duration::ZERO` on other platforms, where no process CPU clock is read.
    pub fn cpu_time(&self) -> Duration {
        self.cpu_time
    }

    pub fn outcome(&self) -> &Result<T, Failure<E>> {
        &self.outcome
    }

    pub fn into_outcome(self) -> Result<T, Failure<E>> {
        self.outcome
    }

    /// Check if this observation is equivalent to another.
    ///
    /// Equivalent when both succeeded with equal values, or both failed
    /// with the same kind of failure.
    pub fn equivalent_to(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        match (&self.outcome, &other.outcome) {
            (Ok(a), Ok(b)) => a == b,
            (Err(a), Err(b)) => a.same_kind(b),
            _ => false,
        }
    }
}

// ============================================================================
// Capture
// ============================================================================

struct Stopwatch {
    wall: Instant,
    cpu: Duration,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            wall: Instant::now(),
            cpu: process_cpu_time(),
        }
    }

    fn finish<T, E>(self, role: Role, outcome: Result<T, Failure<E>>) -> Observation<T, E> {
        Observation {
            role,
            outcome,
            duration: self.wall.elapsed(),
            cpu_time: process_cpu_time().saturating_sub(self.cpu),
        }
    }
}

#[cfg(unix)]
fn process_cpu_time() -> Duration {
    use nix::time::{clock_gettime, ClockId};

    match clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID) {
        Ok(ts) => Duration::new(ts.tv_sec().max(0) as u64, ts.tv_nsec().clamp(0, 999_999_999) as u32),
        Err(_) => Duration::ZERO,
    }
}

#[cfg(not(unix))]
fn process_cpu_time() -> Duration {
    Duration::ZERO
}

fn flatten<T, E>(caught: std::thread::Result<Result<T, E>>) -> Result<T, Failure<E>> {
    match caught {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(Failure::Error(error)),
        Err(payload) => Err(Failure::Panic(PanicPayload::new(payload))),
    }
}

/// Execute a behavior once and capture its observation
pub fn observe<T, E, F>(role: Role, behavior: F) -> Observation<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let stopwatch = Stopwatch::start();
    let caught = panic::catch_unwind(AssertUnwindSafe(behavior));

    stopwatch.finish(role, flatten(caught))
}

/// Async variant of [`observe`]; timing spans the whole await
pub async fn observe_async<T, E, F, Fut>(role: Role, behavior: F) -> Observation<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let stopwatch = Stopwatch::start();

    let caught = match panic::catch_unwind(AssertUnwindSafe(behavior)) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(payload) => Err(payload),
    };

    stopwatch.finish(role, flatten(caught))
}
