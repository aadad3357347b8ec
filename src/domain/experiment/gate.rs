//! Gates decide whether the candidate runs at all
//!
//! Three flavours:
//! - [`EntityGate`] - deterministic per entity (same entity always in or out)
//! - [`GroupGate`] - membership based (entity belongs to an allowed group)
//! - [`RequestGate`] - random per request (simple percentage sampling)

use std::collections::HashSet;

use rand::Rng;
use sha2::{Digest, Sha256};

/// Zero-argument predicate deciding whether the candidate should run
pub trait Gate: Send + Sync {
    fn allows(&self) -> bool;
}

impl<F> Gate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn allows(&self) -> bool {
        self()
    }
}

// ============================================================================
// EntityGate
// ============================================================================

/// Deterministic per-entity gate.
///
/// The same entity always gets the same verdict for a given salt. Use the
/// experiment name as salt so the same entity is not correlated across
/// experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityGate {
    bucket: u8,
    enabled: bool,
}

impl EntityGate {
    /// Build a gate admitting `percent` percent of entities (0-100)
    pub fn new(entity_id: &str, percent: f64, salt: &str) -> Self {
        let bucket = Self::bucket(entity_id, salt);

        Self {
            bucket,
            enabled: f64::from(bucket) < percent,
        }
    }

    /// Stable bucket in `0..100` for an entity and salt.
    ///
    /// The SHA-256 digest of `salt:entity_id` (or `entity_id` alone when the
    /// salt is empty) is read as a big-endian integer and reduced mod 100.
    pub fn bucket(entity_id: &str, salt: &str) -> u8 {
        let digest = if salt.is_empty() {
            Sha256::digest(entity_id.as_bytes())
        } else {
            Sha256::digest(format!("{}:{}", salt, entity_id).as_bytes())
        };

        digest
            .iter()
            .fold(0u32, |acc, byte| (acc * 256 + u32::from(*byte)) % 100) as u8
    }

    pub fn bucket_value(&self) -> u8 {
        self.bucket
    }
}

impl Gate for EntityGate {
    fn allows(&self) -> bool {
        self.enabled
    }
}

/// Deterministic per-entity gate, see [`EntityGate`]
pub fn entity_gate(entity_id: &str, percent: f64, salt: &str) -> EntityGate {
    EntityGate::new(entity_id, percent, salt)
}

// ============================================================================
// GroupGate
// ============================================================================

/// Group membership gate: open when the entity belongs to at least one
/// allowed group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupGate {
    matched: bool,
}

impl GroupGate {
    pub fn new<A, B>(allowed: A, actual: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let allowed: HashSet<String> = allowed
            .into_iter()
            .map(|group| group.as_ref().to_string())
            .collect();

        let matched = actual
            .into_iter()
            .any(|group| allowed.contains(group.as_ref()));

        Self { matched }
    }
}

impl Gate for GroupGate {
    fn allows(&self) -> bool {
        self.matched
    }
}

/// Group membership gate, see [`GroupGate`]
pub fn group_gate<A, B>(allowed: A, actual: B) -> GroupGate
where
    A: IntoIterator,
    A::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    GroupGate::new(allowed, actual)
}

// ============================================================================
// RequestGate
// ============================================================================

/// Random per-request gate. Not reproducible: every call draws again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestGate {
    percent: f64,
}

impl RequestGate {
    /// Build a gate that opens on `percent` percent of calls (0-100)
    pub fn new(percent: f64) -> Self {
        Self { percent }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

impl Gate for RequestGate {
    fn allows(&self) -> bool {
        rand::thread_rng().gen_range(0.0..100.0) < self.percent
    }
}

/// Random per-request gate, see [`RequestGate`]
pub fn request_gate(percent: f64) -> RequestGate {
    RequestGate::new(percent)
}
