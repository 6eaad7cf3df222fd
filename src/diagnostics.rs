//! Release outcomes and the pluggable sink that observes them

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What happened to a resource handed to `release`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Parked in the idle set for reuse
    Returned,

    /// Not currently checked out: a double release, or a value the pool never handed out
    NotAcquired,

    /// Held past `max_idle_time` since checkout, dropped from tracking
    Expired { held: Duration },

    /// Idle set already at `max_idle_size`, dropped from tracking
    IdleFull { max_idle_size: usize },
}

impl ReleaseOutcome {
    pub fn is_returned(&self) -> bool {
        matches!(self, ReleaseOutcome::Returned)
    }
}

impl fmt::Display for ReleaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseOutcome::Returned => write!(f, "resource returned to idle pool"),
            ReleaseOutcome::NotAcquired => write!(
                f,
                "resource not previously acquired; not returning to idle pool"
            ),
            ReleaseOutcome::Expired { held } => write!(
                f,
                "resource expired after being held for {held:?}; not returning to idle pool"
            ),
            ReleaseOutcome::IdleFull { max_idle_size } => write!(
                f,
                "idle pool full ({max_idle_size} resources); not returning to idle pool"
            ),
        }
    }
}

/// Receives the pool's fire-and-forget notices.
///
/// Calls happen while the pool lock is held, so implementations should
/// be quick and must not touch the pool.
///
/// # Examples
///
/// ```
/// use idlepool::{DiagnosticSink, ReleaseOutcome};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CountingSink(AtomicUsize);
///
/// impl DiagnosticSink for CountingSink {
///     fn release_discarded(&self, _outcome: &ReleaseOutcome) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait DiagnosticSink: Send + Sync + 'static {
    /// A release did not end with the resource in the idle set
    fn release_discarded(&self, outcome: &ReleaseOutcome);

    /// `count` expired idle resources were purged
    fn idle_swept(&self, _count: usize) {}
}

impl<S: DiagnosticSink> DiagnosticSink for Arc<S> {
    fn release_discarded(&self, outcome: &ReleaseOutcome) {
        (**self).release_discarded(outcome);
    }

    fn idle_swept(&self, count: usize) {
        (**self).idle_swept(count);
    }
}

/// Default sink, reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn release_discarded(&self, outcome: &ReleaseOutcome) {
        match outcome {
            ReleaseOutcome::NotAcquired => {
                tracing::warn!(outcome = "not_acquired", "{outcome}");
            }
            ReleaseOutcome::Expired { held } => {
                let held_ms = held.as_millis() as u64;
                tracing::debug!(outcome = "expired", held_ms, "{outcome}");
            }
            ReleaseOutcome::IdleFull { max_idle_size } => {
                tracing::debug!(outcome = "idle_full", max_idle_size, "{outcome}");
            }
            ReleaseOutcome::Returned => {}
        }
    }

    fn idle_swept(&self, count: usize) {
        tracing::debug!(count, "swept expired idle resources");
    }
}

/// Sink that drops every notice
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn release_discarded(&self, _outcome: &ReleaseOutcome) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records everything it is told, for assertions
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub outcomes: Mutex<Vec<ReleaseOutcome>>,
        pub swept: Mutex<Vec<usize>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn release_discarded(&self, outcome: &ReleaseOutcome) {
            self.outcomes.lock().push(*outcome);
        }

        fn idle_swept(&self, count: usize) {
            self.swept.lock().push(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_and_full_are_labelled_differently() {
        let expired = ReleaseOutcome::Expired { held: Duration::from_secs(11) }.to_string();
        let full = ReleaseOutcome::IdleFull { max_idle_size: 3 }.to_string();
        assert_ne!(expired, full);
        assert!(expired.contains("expired"));
        assert!(full.contains("full"));
    }

    #[test]
    fn test_is_returned() {
        assert!(ReleaseOutcome::Returned.is_returned());
        assert!(!ReleaseOutcome::NotAcquired.is_returned());
    }

    #[test]
    fn test_tracing_sink_accepts_every_outcome() {
        let sink = TracingSink;
        sink.release_discarded(&ReleaseOutcome::NotAcquired);
        sink.release_discarded(&ReleaseOutcome::Expired { held: Duration::MAX });
        sink.release_discarded(&ReleaseOutcome::IdleFull { max_idle_size: 0 });
        sink.release_discarded(&ReleaseOutcome::Returned);
        sink.idle_swept(2);
    }
}
