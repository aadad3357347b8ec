//! Ambient defaults for publisher and enablement
//!
//! Values resolve per field, innermost first: the current tokio task
//! scope, then thread-scoped overrides (innermost guard first), then the
//! process-wide cell, then the built-in default (no publisher, enabled).

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::publisher::Publisher;

/// A partial set of defaults; `None` fields inherit from the outer layer
#[derive(Clone, Default)]
pub struct DefaultsOverride {
    pub publisher: Option<Arc<dyn Publisher>>,
    pub enabled: Option<bool>,
}

impl DefaultsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Fill unset fields from `outer`
    fn layered_over(self, outer: &DefaultsOverride) -> Self {
        Self {
            publisher: self.publisher.or_else(|| outer.publisher.clone()),
            enabled: self.enabled.or(outer.enabled),
        }
    }
}

impl fmt::Debug for DefaultsOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultsOverride")
            .field("publisher", &self.publisher.as_ref().map(|_| "dyn Publisher"))
            .field("enabled", &self.enabled)
            .finish()
    }
}

static PROCESS_DEFAULTS: Lazy<RwLock<DefaultsOverride>> =
    Lazy::new(|| RwLock::new(DefaultsOverride::default()));

thread_local! {
    static THREAD_OVERRIDES: RefCell<Vec<DefaultsOverride>> = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    static TASK_OVERRIDES: DefaultsOverride;
}

// ============================================================================
// Process-wide cell
// ============================================================================

/// Set the process-wide default publisher
pub fn set_default_publisher(publisher: Option<Arc<dyn Publisher>>) {
    PROCESS_DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .publisher = publisher;
}

/// Set whether experiments run by default, process-wide
pub fn set_default_enabled(enabled: bool) {
    PROCESS_DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .enabled = Some(enabled);
}

/// Default publisher as seen from the current task and thread
pub fn default_publisher() -> Option<Arc<dyn Publisher>> {
    resolve(|layer| layer.publisher.clone())
}

/// Default enablement as seen from the current task and thread (true when unset)
pub fn default_enabled() -> bool {
    resolve(|layer| layer.enabled).unwrap_or(true)
}

fn resolve<V>(field: impl Fn(&DefaultsOverride) -> Option<V>) -> Option<V> {
    if let Some(value) = TASK_OVERRIDES.try_with(|layer| field(layer)).ok().flatten() {
        return Some(value);
    }

    let thread_value = THREAD_OVERRIDES.with(|stack| {
        stack.borrow().iter().rev().find_map(|layer| field(layer))
    });

    if thread_value.is_some() {
        return thread_value;
    }

    field(&PROCESS_DEFAULTS.read().unwrap_or_else(PoisonError::into_inner))
}

// ============================================================================
// Thread scope
// ============================================================================

/// Removes its thread-scoped override when dropped
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct DefaultsGuard {
    depth: usize,
    // Guards must be dropped on the thread that created them
    _not_send: PhantomData<*const ()>,
}

impl fmt::Debug for DefaultsGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultsGuard").field("depth", &self.depth).finish()
    }
}

impl Drop for DefaultsGuard {
    fn drop(&mut self) {
        THREAD_OVERRIDES.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Override defaults on the current thread until the guard drops
pub fn override_defaults(overrides: DefaultsOverride) -> DefaultsGuard {
    let depth = THREAD_OVERRIDES.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(overrides);
        depth
    });

    DefaultsGuard {
        depth,
        _not_send: PhantomData,
    }
}

// ============================================================================
// Task scope
// ============================================================================

/// Run a future with task-scoped defaults; nested scopes inherit unset fields
pub async fn scope_defaults<F>(overrides: DefaultsOverride, future: F) -> F::Output
where
    F: Future,
{
    let layered = match TASK_OVERRIDES.try_with(|outer| overrides.clone().layered_over(outer)) {
        Ok(layered) => layered,
        Err(_) => overrides,
    };

    TASK_OVERRIDES.scope(layered, future).await
}
