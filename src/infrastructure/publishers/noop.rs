//! Publisher that discards results

use crate::domain::experiment::Report;
use crate::domain::publisher::Publisher;

/// Discards every result. Used when no publisher is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl NoopPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl Publisher for NoopPublisher {
    fn publish(&self, _result: &dyn Report) -> anyhow::Result<()> {
        Ok(())
    }
}
