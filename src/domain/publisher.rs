//! Publisher trait - the sink for finished experiment results

#[cfg(test)]
use mockall::automock;

use super::experiment::Report;

/// Consumes finished experiment results.
///
/// Errors and panics from `publish` are swallowed by the experiment; a
/// publisher can never change what the caller observes.
#[cfg_attr(test, automock)]
pub trait Publisher: Send + Sync {
    fn publish(&self, result: &dyn Report) -> anyhow::Result<()>;
}
