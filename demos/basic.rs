//! Basic usage examples for Pool

use idlepool::{Context, Factory, NoopSink, Pool, PoolConfiguration};
#[cfg(feature = "metrics")]
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

/// Stand-in for an expensive handle, e.g. a connection id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Connection {
    id: u32,
}

fn connection_pool(
    config: PoolConfiguration,
) -> Pool<impl Factory<Resource = Connection, Error = std::io::Error>> {
    let next_id = AtomicU32::new(1);
    Pool::new(
        move |_ctx: &Context| -> Result<Connection, std::io::Error> {
            Ok(Connection {
                id: next_id.fetch_add(1, Ordering::Relaxed),
            })
        },
        config,
    )
}

fn main() {
    println!("=== idlepool - Basic Examples ===\n");

    // Example 1: Acquire and release
    acquire_release();

    // Example 2: RAII guard
    guard();

    // Example 3: Idle cap and expiry
    cap_and_expiry();

    // Example 4: Metrics and health
    metrics_and_health();
}

fn acquire_release() {
    println!("1. Acquire / Release:");
    let pool = connection_pool(PoolConfiguration::default());
    let ctx = Context::new();

    let conn = pool.acquire(&ctx).unwrap();
    println!("   Acquired: {:?}", conn);
    pool.release(conn);
    println!("   Idle after release: {}", pool.num_idle());

    let again = pool.acquire(&ctx).unwrap();
    println!("   Reacquired: {:?} (same connection: {})\n", again, again == conn);
}

fn guard() {
    println!("2. RAII Guard:");
    let pool = connection_pool(PoolConfiguration::default());

    {
        let conn = pool.get(&Context::new()).unwrap();
        println!("   Using connection {}", conn.id);
        println!("   In use: {}", pool.num_in_use());
        // Released when `conn` goes out of scope
    }

    println!("   Idle after scope: {}\n", pool.num_idle());
}

fn cap_and_expiry() {
    println!("3. Idle Cap and Expiry:");
    let pool = connection_pool(
        PoolConfiguration::new()
            .with_max_idle_size(2)
            .with_max_idle_time(Duration::from_millis(200))
            .with_diagnostics(NoopSink),
    );
    let ctx = Context::new();

    let conns: Vec<_> = (0..3).map(|_| pool.acquire(&ctx).unwrap()).collect();
    for conn in conns {
        pool.release(conn);
    }
    println!("   Released 3, idle: {} (cap 2)", pool.num_idle());

    println!("   Waiting for idle time to pass...");
    thread::sleep(Duration::from_millis(250));

    let fresh = pool.acquire(&ctx).unwrap();
    println!("   After expiry got new connection {} (idle: {})\n", fresh.id, pool.num_idle());
}

fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let pool = connection_pool(PoolConfiguration::new().with_diagnostics(NoopSink));
    let ctx = Context::new();

    let conn = pool.acquire(&ctx).unwrap();
    pool.release(conn);
    let _ = pool.acquire(&ctx).unwrap();
    pool.release(Connection { id: 999 });

    let metrics = pool.get_metrics();
    println!(
        "   Acquired: {}, reused: {}, created: {}",
        metrics.total_acquired, metrics.reused, metrics.created
    );

    let health = pool.get_health_status();
    println!("   Healthy: {}", health.is_healthy());
    for warning in &health.warnings {
        println!("   Warning: {}", warning);
    }

    #[cfg(feature = "metrics")]
    {
        let mut tags = HashMap::new();
        tags.insert("service".to_string(), "example".to_string());
        match pool.export_metrics_prometheus("example_pool", Some(&tags)) {
            Ok(text) => println!("{}", text),
            Err(err) => println!("   Export failed: {}", err),
        }
    }
}
