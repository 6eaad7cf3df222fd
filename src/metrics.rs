//! Metrics collection and export for resource pools

use crate::diagnostics::ReleaseOutcome;
#[cfg(feature = "metrics")]
use crate::errors::{PoolError, PoolResult};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use idlepool::{Context, Pool, PoolConfiguration};
///
/// let pool = Pool::new(
///     |_ctx: &Context| -> Result<u32, std::io::Error> { Ok(1) },
///     PoolConfiguration::default(),
/// );
///
/// let resource = pool.acquire(&Context::new()).unwrap();
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_acquired, 1);
/// assert_eq!(metrics.created, 1);
/// assert_eq!(metrics.in_use, 1);
///
/// pool.release(resource);
/// assert_eq!(pool.get_metrics().returned_to_idle, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Successful acquires, reused or created
    pub total_acquired: usize,

    /// Acquires served from the idle set
    pub reused: usize,

    /// Acquires served by the factory
    pub created: usize,

    /// Factory calls that returned an error
    pub factory_failures: usize,

    /// Releases that parked the resource as idle
    pub returned_to_idle: usize,

    /// Releases of resources that were not checked out
    pub unknown_releases: usize,

    /// Releases discarded because the resource was held too long
    pub expired_on_release: usize,

    /// Releases discarded because the idle set was full
    pub discarded_idle_full: usize,

    /// Idle resources purged by sweeps
    pub swept: usize,

    /// Resources currently checked out
    pub in_use: usize,

    /// Resources currently idle
    pub idle: usize,

    /// Configured idle cap
    pub max_idle_size: usize,

    /// Share of acquires served from the idle set (0.0 to 1.0)
    pub reuse_ratio: f64,

    /// Idle set fill level (0.0 to 1.0)
    pub idle_utilization: f64,
}

impl PoolMetrics {
    /// Releases that reached a decision about a checked-out resource
    pub fn total_released(&self) -> usize {
        self.returned_to_idle + self.expired_on_release + self.discarded_idle_full
    }

    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("reused".to_string(), self.reused.to_string());
        metrics.insert("created".to_string(), self.created.to_string());
        metrics.insert("factory_failures".to_string(), self.factory_failures.to_string());
        metrics.insert("returned_to_idle".to_string(), self.returned_to_idle.to_string());
        metrics.insert("unknown_releases".to_string(), self.unknown_releases.to_string());
        metrics.insert("expired_on_release".to_string(), self.expired_on_release.to_string());
        metrics.insert("discarded_idle_full".to_string(), self.discarded_idle_full.to_string());
        metrics.insert("swept".to_string(), self.swept.to_string());
        metrics.insert("in_use".to_string(), self.in_use.to_string());
        metrics.insert("idle".to_string(), self.idle.to_string());
        metrics.insert("max_idle_size".to_string(), self.max_idle_size.to_string());
        metrics.insert("reuse_ratio".to_string(), format!("{:.2}", self.reuse_ratio));
        metrics.insert("idle_utilization".to_string(), format!("{:.2}", self.idle_utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use idlepool::{Context, Pool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// let pool = Pool::new(
    ///     |_ctx: &Context| -> Result<u32, std::io::Error> { Ok(1) },
    ///     PoolConfiguration::default(),
    /// );
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("my_pool", Some(&tags)).unwrap();
    /// assert!(output.contains("idlepool_resources_idle"));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};

        let registry = Registry::new_custom(None, Some(Self::format_labels(pool_name, tags)))?;

        let gauges: [(&str, &str, usize); 3] = [
            ("idlepool_resources_in_use", "Resources currently checked out", metrics.in_use),
            ("idlepool_resources_idle", "Resources currently idle", metrics.idle),
            ("idlepool_max_idle_size", "Configured idle cap", metrics.max_idle_size),
        ];
        for (name, help, value) in gauges {
            let gauge = IntGauge::with_opts(Opts::new(name, help))?;
            gauge.set(value as i64);
            registry.register(Box::new(gauge))?;
        }

        let idle_utilization = Gauge::with_opts(Opts::new(
            "idlepool_idle_utilization",
            "Idle set fill level",
        ))?;
        idle_utilization.set(metrics.idle_utilization);
        registry.register(Box::new(idle_utilization))?;

        let counters: [(&str, &str, usize); 9] = [
            ("idlepool_acquired_total", "Successful acquires", metrics.total_acquired),
            ("idlepool_reused_total", "Acquires served from the idle set", metrics.reused),
            ("idlepool_created_total", "Acquires served by the factory", metrics.created),
            ("idlepool_factory_failures_total", "Factory errors", metrics.factory_failures),
            ("idlepool_returned_total", "Releases parked as idle", metrics.returned_to_idle),
            (
                "idlepool_unknown_releases_total",
                "Releases of resources not checked out",
                metrics.unknown_releases,
            ),
            (
                "idlepool_expired_releases_total",
                "Releases discarded as expired",
                metrics.expired_on_release,
            ),
            (
                "idlepool_idle_full_releases_total",
                "Releases discarded with a full idle set",
                metrics.discarded_idle_full,
            ),
            ("idlepool_swept_total", "Idle resources purged by sweeps", metrics.swept),
        ];
        for (name, help, value) in counters {
            let counter = IntCounter::with_opts(Opts::new(name, help))?;
            counter.inc_by(value as u64);
            registry.register(Box::new(counter))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| PoolError::Encoding(e.to_string()))
    }

    fn format_labels(
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> HashMap<String, String> {
        let mut labels = HashMap::new();

        if let Some(tags) = tags {
            for (key, value) in tags {
                labels.insert(key.clone(), value.clone());
            }
        }
        labels.insert("pool".to_string(), pool_name.to_string());

        labels
    }
}

/// Internal metrics tracker
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub reused: AtomicUsize,
    pub created: AtomicUsize,
    pub factory_failures: AtomicUsize,
    pub returned_to_idle: AtomicUsize,
    pub unknown_releases: AtomicUsize,
    pub expired_on_release: AtomicUsize,
    pub discarded_idle_full: AtomicUsize,
    pub swept: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reuse(&self) {
        self.total_acquired.fetch_add(1, Ordering::Relaxed);
        self.reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_create(&self) {
        self.total_acquired.fetch_add(1, Ordering::Relaxed);
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_factory_failure(&self) {
        self.factory_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, count: usize) {
        self.swept.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_release(&self, outcome: &ReleaseOutcome) {
        let counter = match outcome {
            ReleaseOutcome::Returned => &self.returned_to_idle,
            ReleaseOutcome::NotAcquired => &self.unknown_releases,
            ReleaseOutcome::Expired { .. } => &self.expired_on_release,
            ReleaseOutcome::IdleFull { .. } => &self.discarded_idle_full,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, in_use: usize, idle: usize, max_idle_size: usize) -> PoolMetrics {
        let total_acquired = self.total_acquired.load(Ordering::Relaxed);
        let reused = self.reused.load(Ordering::Relaxed);

        let reuse_ratio = if total_acquired > 0 {
            reused as f64 / total_acquired as f64
        } else {
            0.0
        };
        let idle_utilization = if max_idle_size > 0 {
            idle as f64 / max_idle_size as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired,
            reused,
            created: self.created.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            returned_to_idle: self.returned_to_idle.load(Ordering::Relaxed),
            unknown_releases: self.unknown_releases.load(Ordering::Relaxed),
            expired_on_release: self.expired_on_release.load(Ordering::Relaxed),
            discarded_idle_full: self.discarded_idle_full.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            in_use,
            idle,
            max_idle_size,
            reuse_ratio,
            idle_utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_release_outcomes_hit_separate_counters() {
        let tracker = MetricsTracker::new();
        tracker.record_release(&ReleaseOutcome::Returned);
        tracker.record_release(&ReleaseOutcome::NotAcquired);
        tracker.record_release(&ReleaseOutcome::Expired { held: Duration::from_secs(6) });
        tracker.record_release(&ReleaseOutcome::IdleFull { max_idle_size: 3 });
        tracker.record_release(&ReleaseOutcome::IdleFull { max_idle_size: 3 });

        let metrics = tracker.get_metrics(0, 3, 3);
        assert_eq!(metrics.returned_to_idle, 1);
        assert_eq!(metrics.unknown_releases, 1);
        assert_eq!(metrics.expired_on_release, 1);
        assert_eq!(metrics.discarded_idle_full, 2);
        assert_eq!(metrics.total_released(), 4);
        assert_eq!(metrics.idle_utilization, 1.0);
    }

    #[test]
    fn test_reuse_ratio() {
        let tracker = MetricsTracker::new();
        tracker.record_create();
        tracker.record_reuse();
        tracker.record_reuse();
        tracker.record_reuse();

        let metrics = tracker.get_metrics(1, 0, 0);
        assert_eq!(metrics.total_acquired, 4);
        assert_eq!(metrics.reuse_ratio, 0.75);
        assert_eq!(metrics.idle_utilization, 0.0);
        assert_eq!(metrics.export()["reuse_ratio"], "0.75");
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_export() {
        let tracker = MetricsTracker::new();
        tracker.record_create();
        tracker.record_release(&ReleaseOutcome::NotAcquired);

        let output =
            MetricsExporter::export_prometheus(&tracker.get_metrics(1, 0, 3), "db", None).unwrap();

        assert!(output.contains("# TYPE idlepool_acquired_total counter"));
        assert!(output.contains("idlepool_unknown_releases_total{pool=\"db\"} 1"));
        assert!(output.contains("idlepool_max_idle_size{pool=\"db\"} 3"));
    }
}
