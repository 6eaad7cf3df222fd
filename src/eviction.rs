//! Idle-time expiry rules

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Staleness window shared by the sweep and the release check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Expiry {
    max_idle_time: Duration,
}

impl Expiry {
    pub fn new(max_idle_time: Duration) -> Self {
        Self { max_idle_time }
    }

    /// Age of a timestamp at `now`, zero if `since` lies in the future
    pub fn age(since: Instant, now: Instant) -> Duration {
        now.saturating_duration_since(since)
    }

    /// Strictly older than `now - max_idle_time`
    pub fn is_stale(&self, since: Instant, now: Instant) -> bool {
        Self::age(since, now) > self.max_idle_time
    }

    /// Drop every stale entry, returning how many went
    pub fn sweep<T: Eq + Hash>(&self, entries: &mut HashMap<T, Instant>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, since| !self.is_stale(*since, now));
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_IDLE_TIME: Duration = Duration::from_secs(5);

    #[test]
    fn test_boundary_is_not_stale() {
        let expiry = Expiry::new(MAX_IDLE_TIME);
        let since = Instant::now();
        assert!(!expiry.is_stale(since, since + MAX_IDLE_TIME));
        assert!(expiry.is_stale(since, since + MAX_IDLE_TIME + Duration::from_nanos(1)));
    }

    #[test]
    fn test_future_timestamp_has_zero_age() {
        let now = Instant::now();
        assert_eq!(Expiry::age(now + MAX_IDLE_TIME, now), Duration::ZERO);
    }

    #[test]
    fn test_sweep_keeps_fresh_entries() {
        let expiry = Expiry::new(MAX_IDLE_TIME);
        let start = Instant::now();
        let mut entries = HashMap::new();
        entries.insert(1, start);
        entries.insert(2, start + Duration::from_secs(8));
        entries.insert(3, start + Duration::from_secs(9));

        let removed = expiry.sweep(&mut entries, start + Duration::from_secs(10));

        assert_eq!(removed, 1);
        assert!(!entries.contains_key(&1));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_zero_idle_time() {
        let expiry = Expiry::new(Duration::ZERO);
        let now = Instant::now();
        assert!(!expiry.is_stale(now, now));
        assert!(expiry.is_stale(now, now + Duration::from_millis(1)));
    }
}
