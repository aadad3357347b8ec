//! Experiment entity - control, candidate and everything around them

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::comparator::{Comparator, DefaultComparator};
use super::gate::{EntityGate, Gate, GroupGate, RequestGate};
use super::order::{OrderPolicy, RandomOrder};
use super::result::ExperimentResult;
use crate::domain::defaults::default_enabled;
use crate::domain::publisher::Publisher;

pub(crate) type BlockingFn<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;
pub(crate) type SuspendingFn<T, E> =
    Box<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
pub(crate) type IgnoreFilter<T, E> = Box<dyn Fn(&ExperimentResult<T, E>) -> bool + Send + Sync>;
pub(crate) type Hook = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A behavior registered on an experiment
pub(crate) enum Behavior<T, E> {
    /// Runs on the caller's thread
    Blocking(BlockingFn<T, E>),
    /// Awaited; only usable through `run_async`
    Suspending(SuspendingFn<T, E>),
}

// ============================================================================
// Experiment
// ============================================================================

/// Runs a candidate beside the control and reports whether they agree.
///
/// Configure with the chained `with_*` / `run_if*` methods, then call
/// [`Experiment::run`] or [`Experiment::run_async`] as often as needed.
/// The caller always gets the control's outcome.
pub struct Experiment<T, E> {
    pub(super) name: String,
    pub(super) control: Option<Behavior<T, E>>,
    pub(super) candidate: Option<Behavior<T, E>>,
    pub(super) comparator: Box<dyn Comparator<T>>,
    pub(super) publisher: Option<Arc<dyn Publisher>>,
    pub(super) gate: Option<Box<dyn Gate>>,
    pub(super) enabled: Option<bool>,
    pub(super) ignore_filters: Vec<IgnoreFilter<T, E>>,
    pub(super) before_run: Vec<Hook>,
    pub(super) cleanup: Option<Hook>,
    pub(super) raise_on_mismatches: bool,
    pub(super) order: Box<dyn OrderPolicy>,
}

impl<T: PartialEq, E> Experiment<T, E> {
    /// Create an experiment comparing values with `==`
    pub fn new(name: impl Into<String>) -> Self {
        Self::compared_by(name, DefaultComparator)
    }
}

impl<T, E> Experiment<T, E> {
    /// Create an experiment with an explicit comparator, for values
    /// without `PartialEq`
    pub fn compared_by<C>(name: impl Into<String>, comparator: C) -> Self
    where
        C: Comparator<T> + 'static,
    {
        Self {
            name: name.into(),
            control: None,
            candidate: None,
            comparator: Box::new(comparator),
            publisher: None,
            gate: None,
            enabled: None,
            ignore_filters: Vec::new(),
            before_run: Vec::new(),
            cleanup: None,
            raise_on_mismatches: false,
            order: Box::new(RandomOrder),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the control (established) behavior
    pub fn with_control<F>(mut self, control: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.control = Some(Behavior::Blocking(Box::new(control)));
        self
    }

    /// Set an async control behavior
    pub fn with_control_async<F, Fut>(mut self, control: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.control = Some(Behavior::Suspending(Box::new(move || control().boxed())));
        self
    }

    /// Set the candidate (new) behavior
    pub fn with_candidate<F>(mut self, candidate: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.candidate = Some(Behavior::Blocking(Box::new(candidate)));
        self
    }

    /// Set an async candidate behavior
    pub fn with_candidate_async<F, Fut>(mut self, candidate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.candidate = Some(Behavior::Suspending(Box::new(move || candidate().boxed())));
        self
    }

    /// Replace the comparator
    pub fn with_comparator<C>(mut self, comparator: C) -> Self
    where
        C: Comparator<T> + 'static,
    {
        self.comparator = Box::new(comparator);
        self
    }

    /// Publish results to this publisher instead of the ambient default
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Inject the source of the control/candidate ordering
    pub fn with_order_policy<P>(mut self, order: P) -> Self
    where
        P: OrderPolicy + 'static,
    {
        self.order = Box::new(order);
        self
    }

    /// Only run the candidate when the gate allows it
    pub fn run_if<G>(mut self, gate: G) -> Self
    where
        G: Gate + 'static,
    {
        self.gate = Some(Box::new(gate));
        self
    }

    /// Deterministic per-entity gate salted with the experiment name
    pub fn run_if_entity(self, entity_id: &str, percent: f64) -> Self {
        let gate = EntityGate::new(entity_id, percent, &self.name);
        self.run_if(gate)
    }

    /// Run the candidate when the entity belongs to any allowed group
    pub fn run_if_group<A, B>(self, allowed: A, actual: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        self.run_if(GroupGate::new(allowed, actual))
    }

    /// Run the candidate on a random `percent` percent of calls
    pub fn run_if_percent(self, percent: f64) -> Self {
        self.run_if(RequestGate::new(percent))
    }

    /// Explicitly enable or disable, overriding the ambient default
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Add an ignore filter. Filters run in registration order on
    /// mismatches only; the first returning true suppresses the mismatch.
    pub fn ignore<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ExperimentResult<T, E>) -> bool + Send + Sync + 'static,
    {
        self.ignore_filters.push(Box::new(filter));
        self
    }

    /// Add a hook that runs before the behaviors, in registration order
    pub fn before_run<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before_run.push(Box::new(hook));
        self
    }

    /// Set the cleanup action, run on every exit once the run has started
    pub fn clean<F>(mut self, cleanup: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Return a mismatch error on unexpected mismatches
    pub fn raise_on_mismatches(mut self) -> Self {
        self.raise_on_mismatches = true;
        self
    }

    /// Effective enablement: explicit flag, else the ambient default
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or_else(default_enabled)
    }
}

impl<T, E> fmt::Debug for Experiment<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("name", &self.name)
            .field("has_control", &self.control.is_some())
            .field("has_candidate", &self.candidate.is_some())
            .field("has_publisher", &self.publisher.is_some())
            .field("has_gate", &self.gate.is_some())
            .field("enabled", &self.enabled)
            .field("ignore_filters", &self.ignore_filters.len())
            .field("before_run", &self.before_run.len())
            .field("has_cleanup", &self.cleanup.is_some())
            .field("raise_on_mismatches", &self.raise_on_mismatches)
            .finish()
    }
}
