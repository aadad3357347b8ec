//! Publisher that fans a result out to several publishers

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::domain::experiment::Report;
use crate::domain::publisher::Publisher;

/// Forwards each result to every child, in order.
///
/// A child that fails or panics does not stop the others.
#[derive(Clone, Default)]
pub struct CompositePublisher {
    publishers: Vec<Arc<dyn Publisher>>,
}

impl CompositePublisher {
    pub fn new(publishers: Vec<Arc<dyn Publisher>>) -> Self {
        Self { publishers }
    }

    /// Append a child publisher
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

impl fmt::Debug for CompositePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositePublisher")
            .field("publishers", &self.publishers.len())
            .finish()
    }
}

impl Publisher for CompositePublisher {
    fn publish(&self, result: &dyn Report) -> anyhow::Result<()> {
        for publisher in &self.publishers {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| publisher.publish(result)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::experiment::{ExperimentResult, Observation, Role};
    use crate::domain::publisher::mock::{
        FailingPublisher, PanickingPublisher, RecordingPublisher,
    };
    use crate::domain::publisher::MockPublisher;

    fn result() -> ExperimentResult<i32, String> {
        ExperimentResult::new(
            "fanout",
            Observation::new(Role::Control, Ok(1), Duration::ZERO, Duration::ZERO),
            Observation::new(Role::Candidate, Ok(1), Duration::ZERO, Duration::ZERO),
            true,
        )
    }

    #[test]
    fn test_forwards_to_all_children() {
        let first = Arc::new(RecordingPublisher::new());
        let second = Arc::new(RecordingPublisher::new());
        let composite = CompositePublisher::new(vec![first.clone(), second.clone()]);

        composite.publish(&result()).unwrap();

        assert_eq!(first.published().len(), 1);
        assert_eq!(second.published().len(), 1);
        assert_eq!(second.last().unwrap().experiment, "fanout");
    }

    #[test]
    fn test_failing_child_does_not_stop_others() {
        let recording = Arc::new(RecordingPublisher::new());
        let composite = CompositePublisher::default()
            .with_publisher(Arc::new(FailingPublisher))
            .with_publisher(Arc::new(PanickingPublisher))
            .with_publisher(recording.clone());

        assert!(composite.publish(&result()).is_ok());
        assert_eq!(composite.len(), 3);
        assert_eq!(recording.published().len(), 1);
    }

    #[test]
    fn test_each_child_called_once() {
        let mut mock = MockPublisher::new();
        mock.expect_publish().times(1).returning(|_| Ok(()));

        let composite = CompositePublisher::new(vec![Arc::new(mock)]);

        composite.publish(&result()).unwrap();
    }

    #[test]
    fn test_empty_composite_is_ok() {
        let composite = CompositePublisher::default();

        assert!(composite.is_empty());
        assert!(composite.publish(&result()).is_ok());
    }
}
