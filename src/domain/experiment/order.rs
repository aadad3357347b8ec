//! Execution order of control and candidate within one run

use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Which behavior executes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionOrder {
    ControlFirst,
    CandidateFirst,
}

impl ExecutionOrder {
    fn from_coin(control_first: bool) -> Self {
        if control_first {
            Self::ControlFirst
        } else {
            Self::CandidateFirst
        }
    }
}

impl fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlFirst => write!(f, "control_first"),
            Self::CandidateFirst => write!(f, "candidate_first"),
        }
    }
}

/// Source of the per-run ordering decision
pub trait OrderPolicy: Send + Sync {
    fn next_order(&self) -> ExecutionOrder;
}

/// Fair coin flip on the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrder;

impl OrderPolicy for RandomOrder {
    fn next_order(&self) -> ExecutionOrder {
        ExecutionOrder::from_coin(rand::thread_rng().gen_bool(0.5))
    }
}

/// Fair coin flip on a seeded RNG, reproducible across processes
#[derive(Debug)]
pub struct SeededOrder {
    rng: Mutex<StdRng>,
}

impl SeededOrder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl OrderPolicy for SeededOrder {
    fn next_order(&self) -> ExecutionOrder {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        ExecutionOrder::from_coin(rng.gen_bool(0.5))
    }
}

/// Always the same order
#[derive(Debug, Clone, Copy)]
pub struct FixedOrder(pub ExecutionOrder);

impl OrderPolicy for FixedOrder {
    fn next_order(&self) -> ExecutionOrder {
        self.0
    }
}
