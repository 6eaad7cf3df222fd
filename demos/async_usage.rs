//! Async usage examples

use idlepool::{AsyncFactory, AsyncPool, Context, ContextError, PoolConfiguration};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Pretends to open a connection, taking `latency` to do so
struct Connector {
    opened: AtomicUsize,
    latency: Duration,
}

#[async_trait::async_trait]
impl AsyncFactory for Connector {
    type Resource = usize;
    type Error = ContextError;

    async fn create(&self, ctx: &Context) -> Result<usize, ContextError> {
        tokio::select! {
            err = ctx.done() => Err(err),
            _ = sleep(self.latency) => Ok(self.opened.fetch_add(1, Ordering::Relaxed) + 1),
        }
    }
}

fn connector(latency: Duration) -> Connector {
    Connector {
        opened: AtomicUsize::new(0),
        latency,
    }
}

#[tokio::main]
async fn main() {
    println!("=== idlepool - Async Examples ===\n");

    // Example 1: Async acquire
    async_acquire().await;

    // Example 2: Factory respecting a deadline
    deadline().await;

    // Example 3: Concurrent access
    concurrent_access().await;
}

async fn async_acquire() {
    println!("1. Async Acquire:");
    let pool = AsyncPool::new(connector(Duration::from_millis(10)), PoolConfiguration::default());
    let ctx = Context::new();

    let conn = pool.acquire(&ctx).await.unwrap();
    println!("   Opened connection {}", conn);
    pool.release(conn).await;

    let again = pool.acquire(&ctx).await.unwrap();
    println!("   Reused connection {}\n", again);
}

async fn deadline() {
    println!("2. Deadline:");
    let pool = AsyncPool::new(connector(Duration::from_secs(5)), PoolConfiguration::default());
    let ctx = Context::new().with_timeout(Duration::from_millis(100));

    match pool.acquire(&ctx).await {
        Ok(conn) => println!("   Got connection {}", conn),
        Err(err) => println!("   Factory gave up: {}", err),
    }
    println!("   In use: {}\n", pool.num_in_use().await);
}

async fn concurrent_access() {
    println!("3. Concurrent Access:");
    let pool = AsyncPool::new(
        connector(Duration::from_millis(5)),
        PoolConfiguration::new().with_max_idle_size(4),
    );

    let mut handles = vec![];
    for i in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let ctx = Context::new();
            if let Ok(conn) = pool.acquire(&ctx).await {
                println!("   Task {} got connection {}", i, conn);
                sleep(Duration::from_millis(20)).await;
                pool.release(conn).await;
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    let metrics = pool.get_metrics().await;
    println!(
        "   Created: {}, reused: {}, idle: {}",
        metrics.created, metrics.reused, metrics.idle
    );
}
