//! Experiment domain module
//!
//! Runs a candidate behavior beside the established control, compares the
//! two observations and hands the result to a publisher, while the caller
//! only ever sees the control's outcome.

mod comparator;
mod entity;
mod executor;
mod gate;
mod observation;
mod order;
mod result;

pub use comparator::{
    comparator_from_fn, AsF64, Comparator, DefaultComparator, FnComparator, PercentDifference,
    SetEquality,
};
pub use entity::Experiment;
pub use gate::{entity_gate, group_gate, request_gate, EntityGate, Gate, GroupGate, RequestGate};
pub use observation::{observe, observe_async, Failure, Observation, PanicPayload, Role};
pub use order::{ExecutionOrder, FixedOrder, OrderPolicy, RandomOrder, SeededOrder};
pub use result::{ExperimentResult, ObservationReport, Report};
