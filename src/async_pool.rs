//! Async resource pool backed by a tokio mutex

use crate::config::PoolConfiguration;
use crate::context::Context;
#[cfg(feature = "metrics")]
use crate::errors::PoolResult;
use crate::factory::AsyncFactory;
use crate::health::HealthStatus;
#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;
use crate::metrics::PoolMetrics;
use crate::state::{Ledger, PoolState};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::Instrument;

struct Shared<F: AsyncFactory> {
    factory: F,
    ledger: Ledger,
    state: Mutex<PoolState<F::Resource>>,
}

/// Async counterpart of [`Pool`](crate::Pool).
///
/// The factory future is awaited with the pool lock held, so an acquire
/// stays atomic with respect to every other operation on the pool. Waiting
/// for the lock is not cancellable; cancellation belongs to the factory.
///
/// # Examples
///
/// ```
/// use idlepool::{AsyncPool, Context, PoolConfiguration};
///
/// # #[tokio::main]
/// # async fn main() {
/// let pool = AsyncPool::new(
///     |_ctx: Context| async { Ok::<_, std::io::Error>(String::from("conn-1")) },
///     PoolConfiguration::default(),
/// );
///
/// let conn = pool.acquire(&Context::new()).await.unwrap();
/// pool.release(conn).await;
/// assert_eq!(pool.num_idle().await, 1);
/// # }
/// ```
pub struct AsyncPool<F: AsyncFactory> {
    shared: Arc<Shared<F>>,
}

impl<F: AsyncFactory> Clone for AsyncPool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: AsyncFactory> AsyncPool<F> {
    /// Create an empty pool around an async factory
    pub fn new(factory: F, config: PoolConfiguration) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory,
                ledger: Ledger::new(config),
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Check out a resource, creating one through the factory on a miss
    pub async fn acquire(&self, ctx: &Context) -> Result<F::Resource, F::Error> {
        let ledger = &self.shared.ledger;

        async {
            let mut state = self.shared.state.lock().await;

            if let Some(resource) = ledger.reuse(&mut *state, Instant::now()) {
                return Ok(resource);
            }

            match self.shared.factory.create(ctx).await {
                Ok(resource) => Ok(ledger.created(&mut *state, resource, Instant::now())),
                Err(err) => {
                    ledger.factory_failed();
                    Err(err)
                }
            }
        }
        .instrument(tracing::debug_span!("pool_acquire"))
        .await
    }

    /// Return a resource. Never fails.
    pub async fn release(&self, resource: F::Resource) {
        let mut state = self.shared.state.lock().await;
        self.shared.ledger.release(&mut *state, resource, Instant::now());
    }

    pub async fn num_idle(&self) -> usize {
        self.shared.state.lock().await.num_idle()
    }

    pub async fn num_in_use(&self) -> usize {
        self.shared.state.lock().await.num_in_use()
    }

    /// Run the idle sweep without acquiring
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.shared.state.lock().await;
        self.shared.ledger.sweep(&mut *state, Instant::now())
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.shared.ledger.config
    }

    pub async fn get_metrics(&self) -> PoolMetrics {
        let state = self.shared.state.lock().await;
        self.shared.ledger.metrics(&*state)
    }

    pub async fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().await.export()
    }

    pub async fn get_health_status(&self) -> HealthStatus {
        HealthStatus::from_metrics(&self.get_metrics().await)
    }

    #[cfg(feature = "metrics")]
    pub async fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        MetricsExporter::export_prometheus(&self.get_metrics().await, pool_name, tags)
    }
}
