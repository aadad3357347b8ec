//! Domain layer - experiments, results and the publisher seam

pub mod defaults;
pub mod error;
pub mod experiment;
pub mod publisher;

pub use defaults::{
    default_enabled, default_publisher, override_defaults, scope_defaults, set_default_enabled,
    set_default_publisher, DefaultsGuard, DefaultsOverride,
};
pub use error::{ConfigurationError, ExperimentError, MismatchError};
pub use experiment::{
    comparator_from_fn, entity_gate, group_gate, observe, observe_async, request_gate, AsF64,
    Comparator, DefaultComparator, EntityGate, ExecutionOrder, Experiment, ExperimentResult,
    Failure, FixedOrder, FnComparator, Gate, GroupGate, Observation, ObservationReport, OrderPolicy,
    PanicPayload, PercentDifference, RandomOrder, Report, RequestGate, Role, SeededOrder,
    SetEquality,
};
pub use publisher::Publisher;
