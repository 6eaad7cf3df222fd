//! Synchronous resource pool

use crate::config::PoolConfiguration;
use crate::context::Context;
#[cfg(feature = "metrics")]
use crate::errors::PoolResult;
use crate::factory::Factory;
use crate::health::HealthStatus;
#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;
use crate::metrics::PoolMetrics;
use crate::state::{Ledger, PoolState};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Instant;

/// A checked-out resource that is released back to its pool when dropped
pub struct PooledResource<F: Factory> {
    resource: Option<F::Resource>,
    pool: Pool<F>,
}

impl<F: Factory> PooledResource<F> {
    /// Detach the resource from the guard.
    ///
    /// The pool still counts it as checked out until it is passed to
    /// [`Pool::release`].
    pub fn into_inner(mut self) -> F::Resource {
        self.resource.take().expect("Resource already taken")
    }
}

impl<F: Factory> Deref for PooledResource<F> {
    type Target = F::Resource;

    fn deref(&self) -> &Self::Target {
        self.resource.as_ref().expect("Resource already taken")
    }
}

impl<F: Factory> DerefMut for PooledResource<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.resource.as_mut().expect("Resource already taken")
    }
}

impl<F: Factory> Drop for PooledResource<F> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl<F: Factory> fmt::Debug for PooledResource<F>
where
    F::Resource: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledResource").field(&self.resource).finish()
    }
}

struct Shared<F: Factory> {
    factory: F,
    ledger: Ledger,
    state: Mutex<PoolState<F::Resource>>,
}

/// Thread-safe pool that reuses idle resources and falls back to a factory.
///
/// Every operation holds one lock for its whole duration, factory call
/// included. Cloning the pool yields another handle to the same state.
///
/// # Examples
///
/// ```
/// use idlepool::{Context, Pool, PoolConfiguration};
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::time::Duration;
///
/// let next_id = AtomicU64::new(0);
/// let pool = Pool::new(
///     move |_ctx: &Context| -> Result<u64, std::io::Error> {
///         Ok(next_id.fetch_add(1, Ordering::Relaxed))
///     },
///     PoolConfiguration::new()
///         .with_max_idle_size(3)
///         .with_max_idle_time(Duration::from_secs(5)),
/// );
///
/// let ctx = Context::new();
/// let first = pool.acquire(&ctx).unwrap();
/// pool.release(first);
/// assert_eq!(pool.num_idle(), 1);
///
/// // The idle resource is reused instead of calling the factory again
/// assert_eq!(pool.acquire(&ctx).unwrap(), first);
/// assert_eq!(pool.num_idle(), 0);
/// ```
pub struct Pool<F: Factory> {
    shared: Arc<Shared<F>>,
}

impl<F: Factory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: Factory> Pool<F> {
    /// Create an empty pool around a factory
    pub fn new(factory: F, config: PoolConfiguration) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory,
                ledger: Ledger::new(config),
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Check out a resource: sweep expired idle ones, reuse a survivor, or
    /// create a new one.
    ///
    /// The factory's error is returned as is, with pool state untouched.
    pub fn acquire(&self, ctx: &Context) -> Result<F::Resource, F::Error> {
        let _span = tracing::debug_span!("pool_acquire").entered();
        let ledger = &self.shared.ledger;
        let mut state = self.shared.state.lock();

        if let Some(resource) = ledger.reuse(&mut *state, Instant::now()) {
            return Ok(resource);
        }

        match self.shared.factory.create(ctx) {
            Ok(resource) => Ok(ledger.created(&mut *state, resource, Instant::now())),
            Err(err) => {
                ledger.factory_failed();
                Err(err)
            }
        }
    }

    /// Like [`acquire`](Self::acquire), wrapped in a guard that releases on drop
    pub fn get(&self, ctx: &Context) -> Result<PooledResource<F>, F::Error> {
        let resource = self.acquire(ctx)?;
        Ok(PooledResource {
            resource: Some(resource),
            pool: self.clone(),
        })
    }

    /// Return a resource. Never fails.
    ///
    /// Unknown, expired, or surplus resources are dropped from tracking and
    /// reported to the configured diagnostic sink.
    pub fn release(&self, resource: F::Resource) {
        let mut state = self.shared.state.lock();
        self.shared.ledger.release(&mut *state, resource, Instant::now());
    }

    /// Snapshot of the idle set size
    pub fn num_idle(&self) -> usize {
        self.shared.state.lock().num_idle()
    }

    /// Snapshot of the checked-out set size
    pub fn num_in_use(&self) -> usize {
        self.shared.state.lock().num_in_use()
    }

    /// Run the idle sweep without acquiring, returning how many were purged
    pub fn purge_expired(&self) -> usize {
        let mut state = self.shared.state.lock();
        self.shared.ledger.sweep(&mut *state, Instant::now())
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.shared.ledger.config
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let state = self.shared.state.lock();
        self.shared.ledger.metrics(&*state)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus::from_metrics(&self.get_metrics())
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }
}
