//! Process-wide defaults, kept in their own test binary so writes to the
//! shared cell cannot leak into unrelated tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pmp_scientist::{default_enabled, set_default_enabled, Experiment};

/// Restores the process-wide enablement when dropped
struct RestoreEnabled;

impl Drop for RestoreEnabled {
    fn drop(&mut self) {
        set_default_enabled(true);
    }
}

fn counting_experiment(calls: &Arc<AtomicUsize>) -> Experiment<i32, String> {
    let calls = calls.clone();

    Experiment::new("process-defaults")
        .with_control(|| Ok(1))
        .with_candidate(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        })
}

#[test]
fn test_process_default_enabled_controls_runs() {
    let _restore = RestoreEnabled;
    let calls = Arc::new(AtomicUsize::new(0));

    set_default_enabled(false);
    assert!(!default_enabled());

    assert_eq!(counting_experiment(&calls).run().unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(counting_experiment(&calls).enabled(true).run().unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    set_default_enabled(true);
    assert!(default_enabled());

    counting_experiment(&calls).run().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
