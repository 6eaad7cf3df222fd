//! Health monitoring for resource pools

use crate::metrics::PoolMetrics;

/// Releases needed before the discard ratio is judged
const DISCARD_SAMPLE_SIZE: usize = 10;

/// Health status of a pool
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
/// let health = pool.get_health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.idle_resources, 0);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Idle set fill level (0.0 to 1.0)
    pub idle_utilization: f64,

    /// Idle resources count
    pub idle_resources: usize,

    /// Checked-out resources count
    pub in_use_resources: usize,

    /// Configured idle cap
    pub max_idle_size: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Derive a health status from a metrics snapshot
    pub fn from_metrics(metrics: &PoolMetrics) -> Self {
        let mut warnings = Vec::new();
        let mut is_healthy = true;

        // Releasing something that was never handed out is a caller bug
        if metrics.unknown_releases > 0 {
            warnings.push(format!(
                "{} release(s) of resources that were not checked out",
                metrics.unknown_releases
            ));
            is_healthy = false;
        }

        let factory_calls = metrics.created + metrics.factory_failures;
        if factory_calls > 0 && metrics.factory_failures * 2 > factory_calls {
            warnings.push(format!(
                "Factory failing: {} of {} calls",
                metrics.factory_failures, factory_calls
            ));
            is_healthy = false;
        }

        if metrics.max_idle_size > 0 && metrics.idle >= metrics.max_idle_size {
            warnings.push("Idle set at capacity".to_string());
        }

        let released = metrics.total_released();
        let discarded = metrics.expired_on_release + metrics.discarded_idle_full;
        if released >= DISCARD_SAMPLE_SIZE && discarded * 2 > released {
            warnings.push(format!(
                "High discard ratio: {:.1}%",
                discarded as f64 / released as f64 * 100.0
            ));
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            idle_utilization: metrics.idle_utilization,
            idle_resources: metrics.idle,
            in_use_resources: metrics.in_use,
            max_idle_size: metrics.max_idle_size,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
