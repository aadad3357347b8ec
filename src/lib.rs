//! PMP Scientist
//!
//! Safely refactor critical code paths by running a new implementation (the
//! candidate) beside the established one (the control):
//! - The caller always gets the control's outcome, errors and panics included
//! - Candidate failures are captured and never escape
//! - Results are compared with a pluggable comparator and sent to a publisher
//! - Gates decide per call, per entity or per group whether the candidate runs
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pmp_scientist::{Experiment, LogPublisher};
//!
//! fn legacy_price(id: u64) -> Result<u64, String> { Ok(id * 2) }
//! fn new_price(id: u64) -> Result<u64, String> { Ok(id + id) }
//!
//! let experiment = Experiment::new("pricing")
//!     .with_control(|| legacy_price(21))
//!     .with_candidate(|| new_price(21))
//!     .with_publisher(Arc::new(LogPublisher::new()));
//!
//! let price = experiment.run()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::{PublisherKind, ScientistConfig};
pub use crate::domain::{
    comparator_from_fn, default_enabled, default_publisher, entity_gate, group_gate, observe,
    observe_async, override_defaults, request_gate, scope_defaults, set_default_enabled,
    set_default_publisher, AsF64, Comparator, ConfigurationError, DefaultComparator, DefaultsGuard,
    DefaultsOverride, EntityGate, ExecutionOrder, Experiment, ExperimentError, ExperimentResult,
    Failure, FixedOrder, FnComparator, Gate, GroupGate, MismatchError, Observation,
    ObservationReport, OrderPolicy, PanicPayload, PercentDifference, Publisher, RandomOrder,
    Report, RequestGate, Role, SeededOrder, SetEquality,
};
pub use crate::infrastructure::{
    init_metrics, init_tracing, CompositePublisher, LogFormat, LoggingConfig, LogPublisher,
    MetricsConfig, MetricsPublisher, NoopPublisher,
};
