// idlepool - thread-safe resource pool with idle expiry

// This is just a binary wrapper - the actual library is in lib.rs
// Run with: cargo run --features cli
// Run examples with: cargo run --example basic

use idlepool::{Context, Pool, PoolConfiguration};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("idlepool=debug")),
        )
        .init();

    println!("=== idlepool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    // Quick demo
    println!("Quick Demo:");
    let next_id = AtomicU64::new(1);
    let pool = Pool::new(
        move |_ctx: &Context| -> Result<u64, std::io::Error> {
            Ok(next_id.fetch_add(1, Ordering::Relaxed))
        },
        PoolConfiguration::new()
            .with_max_idle_size(1)
            .with_max_idle_time(Duration::from_secs(5)),
    );

    let ctx = Context::new();
    match (pool.acquire(&ctx), pool.acquire(&ctx)) {
        (Ok(first), Ok(second)) => {
            println!("  Acquired: {first}, {second}");
            pool.release(first);
            // Idle set holds one, so this one is discarded
            pool.release(second);
            // Already released: logged and ignored
            pool.release(first);
        }
        (first, second) => eprintln!("  Factory failed: {first:?} {second:?}"),
    }

    println!("  Idle after release: {}", pool.num_idle());
}
