//! Pool configuration options

use crate::diagnostics::{DiagnosticSink, TracingSink};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use idlepool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_idle_size(3)
///     .with_max_idle_time(Duration::from_secs(5));
///
/// assert_eq!(config.max_idle_size, 3);
/// assert_eq!(config.max_idle_time, Duration::from_secs(5));
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Maximum number of idle resources kept for reuse; zero disables reuse
    pub max_idle_size: usize,

    /// How long a resource may sit idle, or stay checked out, before it is stale
    pub max_idle_time: Duration,

    /// Where "not returning to idle pool" notices go
    #[cfg_attr(feature = "serde", serde(skip, default = "default_diagnostics"))]
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

fn default_diagnostics() -> Arc<dyn DiagnosticSink> {
    Arc::new(TracingSink)
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_idle_size: 8,
            max_idle_time: Duration::from_secs(30),
            diagnostics: default_diagnostics(),
        }
    }
}

impl fmt::Debug for PoolConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("max_idle_size", &self.max_idle_size)
            .field("max_idle_time", &self.max_idle_time)
            .finish_non_exhaustive()
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the idle set cap
    pub fn with_max_idle_size(mut self, size: usize) -> Self {
        self.max_idle_size = size;
        self
    }

    /// Set the staleness window
    pub fn with_max_idle_time(mut self, time: Duration) -> Self {
        self.max_idle_time = time;
        self
    }

    /// Route diagnostics to a custom sink
    ///
    /// # Examples
    ///
    /// ```
    /// use idlepool::{NoopSink, PoolConfiguration};
    ///
    /// let config = PoolConfiguration::new().with_diagnostics(NoopSink);
    /// assert_eq!(config.max_idle_size, 8);
    /// ```
    pub fn with_diagnostics<S: DiagnosticSink>(mut self, sink: S) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::diagnostics::ReleaseOutcome;

    #[test]
    fn test_json_round_trip_keeps_limits() {
        let config = PoolConfiguration::new()
            .with_max_idle_size(3)
            .with_max_idle_time(Duration::from_millis(1500));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("diagnostics"));

        let restored: PoolConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.max_idle_size, 3);
        assert_eq!(restored.max_idle_time, Duration::from_millis(1500));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: PoolConfiguration = serde_json::from_str(r#"{"max_idle_size":3}"#).unwrap();
        assert_eq!(config.max_idle_size, 3);
        assert_eq!(config.max_idle_time, Duration::from_secs(30));

        let config: PoolConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_idle_size, 8);
        config.diagnostics.release_discarded(&ReleaseOutcome::NotAcquired);
    }
}
