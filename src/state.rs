//! The lock-protected bookkeeping shared by the sync and async pools

use crate::config::PoolConfiguration;
use crate::diagnostics::ReleaseOutcome;
use crate::eviction::Expiry;
use crate::metrics::{MetricsTracker, PoolMetrics};

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// Checked-out and idle resources, keyed by identity.
///
/// Invariant: a key is never in `in_use` and `idle` at the same time.
#[derive(Debug)]
pub(crate) struct PoolState<T> {
    in_use: HashMap<T, Instant>,
    idle: HashMap<T, Instant>,
}

impl<T> Default for PoolState<T> {
    fn default() -> Self {
        Self {
            in_use: HashMap::new(),
            idle: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> PoolState<T> {
    pub fn num_idle(&self) -> usize {
        self.idle.len()
    }

    pub fn num_in_use(&self) -> usize {
        self.in_use.len()
    }

    pub fn sweep(&mut self, expiry: &Expiry, now: Instant) -> usize {
        expiry.sweep(&mut self.idle, now)
    }

    /// Move one idle resource, chosen arbitrarily, into `in_use`
    pub fn take_idle(&mut self, now: Instant) -> Option<T> {
        let key = self.idle.keys().next()?.clone();
        let (resource, _) = self.idle.remove_entry(&key)?;
        self.in_use.insert(resource, now);
        Some(key)
    }

    /// Record a freshly created resource as checked out
    pub fn check_out(&mut self, resource: T, now: Instant) -> T {
        // A factory may hand back an identity that is still parked as idle.
        self.idle.remove(&resource);
        if self.in_use.insert(resource.clone(), now).is_some() {
            tracing::warn!("factory returned a resource that is already checked out");
        }
        resource
    }

    pub fn check_in(
        &mut self,
        resource: T,
        now: Instant,
        max_idle_size: usize,
        expiry: &Expiry,
    ) -> ReleaseOutcome {
        let Some(checked_out_at) = self.in_use.remove(&resource) else {
            return ReleaseOutcome::NotAcquired;
        };

        if expiry.is_stale(checked_out_at, now) {
            return ReleaseOutcome::Expired {
                held: Expiry::age(checked_out_at, now),
            };
        }
        if self.idle.len() >= max_idle_size {
            return ReleaseOutcome::IdleFull { max_idle_size };
        }

        self.idle.insert(resource, now);
        ReleaseOutcome::Returned
    }

    #[cfg(test)]
    pub fn is_idle(&self, resource: &T) -> bool {
        self.idle.contains_key(resource)
    }

    #[cfg(test)]
    pub fn is_in_use(&self, resource: &T) -> bool {
        self.in_use.contains_key(resource)
    }

    #[cfg(test)]
    pub fn insert_idle(&mut self, resource: T, since: Instant) {
        self.idle.insert(resource, since);
    }

    #[cfg(test)]
    pub fn insert_in_use(&mut self, resource: T, since: Instant) {
        self.in_use.insert(resource, since);
    }

    #[cfg(test)]
    pub fn is_disjoint(&self) -> bool {
        self.in_use.keys().all(|key| !self.idle.contains_key(key))
    }
}

/// Configuration, counters and diagnostics wrapped around every transition.
///
/// Methods take the already-locked state; the caller owns the lock.
pub(crate) struct Ledger {
    pub config: PoolConfiguration,
    expiry: Expiry,
    metrics: MetricsTracker,
}

impl Ledger {
    pub fn new(config: PoolConfiguration) -> Self {
        Self {
            expiry: Expiry::new(config.max_idle_time),
            config,
            metrics: MetricsTracker::new(),
        }
    }

    pub fn sweep<T: Eq + Hash + Clone>(&self, state: &mut PoolState<T>, now: Instant) -> usize {
        let swept = state.sweep(&self.expiry, now);
        if swept > 0 {
            self.metrics.record_sweep(swept);
            self.config.diagnostics.idle_swept(swept);
        }
        swept
    }

    /// Sweep, then hand out an idle resource if one survived
    pub fn reuse<T: Eq + Hash + Clone>(&self, state: &mut PoolState<T>, now: Instant) -> Option<T> {
        self.sweep(state, now);
        let resource = state.take_idle(now)?;
        self.metrics.record_reuse();
        tracing::trace!(idle = state.num_idle(), "reusing idle resource");
        Some(resource)
    }

    pub fn created<T: Eq + Hash + Clone>(
        &self,
        state: &mut PoolState<T>,
        resource: T,
        now: Instant,
    ) -> T {
        self.metrics.record_create();
        tracing::trace!(in_use = state.num_in_use() + 1, "created resource");
        state.check_out(resource, now)
    }

    pub fn factory_failed(&self) {
        self.metrics.record_factory_failure();
        tracing::debug!("resource factory failed");
    }

    pub fn release<T: Eq + Hash + Clone>(
        &self,
        state: &mut PoolState<T>,
        resource: T,
        now: Instant,
    ) -> ReleaseOutcome {
        let outcome = state.check_in(resource, now, self.config.max_idle_size, &self.expiry);
        self.metrics.record_release(&outcome);
        if !outcome.is_returned() {
            self.config.diagnostics.release_discarded(&outcome);
        }
        outcome
    }

    pub fn metrics<T: Eq + Hash + Clone>(&self, state: &PoolState<T>) -> PoolMetrics {
        self.metrics.get_metrics(
            state.num_in_use(),
            state.num_idle(),
            self.config.max_idle_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MAX_IDLE_SIZE: usize = 3;
    const MAX_IDLE_TIME: Duration = Duration::from_secs(5);

    fn expiry() -> Expiry {
        Expiry::new(MAX_IDLE_TIME)
    }

    #[test]
    fn test_take_idle_moves_resource() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.insert_idle(2, now);

        assert_eq!(state.take_idle(now), Some(2));
        assert!(state.is_in_use(&2));
        assert_eq!(state.num_idle(), 0);
        assert!(state.take_idle(now).is_none());
    }

    #[test]
    fn test_sweep_then_take_skips_expired() {
        let start = Instant::now();
        let mut state = PoolState::default();
        state.insert_idle(2, start);

        let later = start + MAX_IDLE_TIME * 2;
        assert_eq!(state.sweep(&expiry(), later), 1);
        assert!(state.take_idle(later).is_none());
        assert_eq!(state.num_in_use(), 0);
    }

    #[test]
    fn test_check_out_clears_colliding_idle_entry() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.insert_idle(7, now);

        state.check_out(7, now);

        assert!(state.is_in_use(&7));
        assert!(!state.is_idle(&7));
        assert!(state.is_disjoint());
    }

    #[test]
    fn test_check_out_of_held_identity_keeps_one_entry() {
        let start = Instant::now();
        let later = start + Duration::from_secs(1);
        let mut state = PoolState::default();
        state.check_out(1, start);

        assert_eq!(state.check_out(1, later), 1);

        assert_eq!(state.num_in_use(), 1);
        assert_eq!(state.num_idle(), 0);
        assert!(state.is_disjoint());
    }

    #[test]
    fn test_check_in_unknown_is_noop() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.insert_in_use(1, now);

        let outcome = state.check_in(2, now, MAX_IDLE_SIZE, &expiry());

        assert_eq!(outcome, ReleaseOutcome::NotAcquired);
        assert!(state.is_in_use(&1));
        assert_eq!(state.num_in_use(), 1);
        assert_eq!(state.num_idle(), 0);
    }

    #[test]
    fn test_check_in_expired_is_discarded() {
        let start = Instant::now();
        let mut state = PoolState::default();
        state.insert_in_use(2, start);

        let later = start + MAX_IDLE_TIME * 2;
        let outcome = state.check_in(2, later, MAX_IDLE_SIZE, &expiry());

        assert_eq!(outcome, ReleaseOutcome::Expired { held: MAX_IDLE_TIME * 2 });
        assert_eq!(state.num_in_use(), 0);
        assert_eq!(state.num_idle(), 0);
    }

    #[test]
    fn test_check_in_valid_goes_idle() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.insert_in_use(2, now);

        let outcome = state.check_in(2, now, MAX_IDLE_SIZE, &expiry());

        assert_eq!(outcome, ReleaseOutcome::Returned);
        assert_eq!(state.num_in_use(), 0);
        assert!(state.is_idle(&2));
    }

    #[test]
    fn test_check_in_with_full_idle_set_is_discarded() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.insert_in_use(2, now);
        for id in 5..8 {
            state.insert_idle(id, now);
        }

        let outcome = state.check_in(2, now, MAX_IDLE_SIZE, &expiry());

        assert_eq!(outcome, ReleaseOutcome::IdleFull { max_idle_size: MAX_IDLE_SIZE });
        assert_eq!(state.num_in_use(), 0);
        assert_eq!(state.num_idle(), MAX_IDLE_SIZE);
        assert!(!state.is_idle(&2));
    }

    #[test]
    fn test_double_release() {
        let now = Instant::now();
        let mut state = PoolState::default();
        state.check_out(4, now);

        assert!(state.check_in(4, now, MAX_IDLE_SIZE, &expiry()).is_returned());
        assert_eq!(
            state.check_in(4, now, MAX_IDLE_SIZE, &expiry()),
            ReleaseOutcome::NotAcquired
        );
        assert_eq!(state.num_idle(), 1);
    }
}
