//! # idlepool
//!
//! Thread-safe pool for expensive resources (connections, buffers, handles)
//! that reuses idle resources, falls back to a caller-supplied factory, and
//! forgets resources that sat idle too long.
//!
//! ## Features
//!
//! - One lock per pool; acquire, release and counting are each atomic
//! - Factory errors are returned to the caller untouched
//! - Idle set capped by size and aged out by time
//! - Release never fails; bad releases go to a pluggable diagnostic sink
//! - Automatic release via RAII (`Drop`) with [`Pool::get`]
//! - Async pool on tokio with cancellable factory contexts
//! - Metrics, health status and Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use idlepool::{Context, Pool, PoolConfiguration};
//! use std::time::Duration;
//!
//! let pool = Pool::new(
//!     |_ctx: &Context| -> Result<u32, std::io::Error> { Ok(1) },
//!     PoolConfiguration::new()
//!         .with_max_idle_size(3)
//!         .with_max_idle_time(Duration::from_secs(5)),
//! );
//! {
//!     let resource = pool.get(&Context::new()).unwrap();
//!     println!("Got: {}", *resource);
//!     // Resource automatically released when `resource` goes out of scope
//! }
//! assert_eq!(pool.num_idle(), 1);
//! ```

mod async_pool;
mod config;
mod context;
mod diagnostics;
mod errors;
mod eviction;
mod factory;
mod health;
mod metrics;
mod pool;
mod state;

pub use async_pool::AsyncPool;
pub use config::PoolConfiguration;
pub use context::Context;
pub use diagnostics::{DiagnosticSink, NoopSink, ReleaseOutcome, TracingSink};
pub use errors::{ContextError, PoolError, PoolResult};
pub use factory::{AsyncFactory, Factory};
pub use health::HealthStatus;
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::{Pool, PooledResource};
