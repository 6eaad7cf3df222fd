//! Error types for the resource pool
//!
//! Factory failures are never represented here: `acquire` hands the
//! factory's own error back to the caller untouched.

use thiserror::Error;

/// Why a [`Context`](crate::Context) is no longer live
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("Context was cancelled")]
    Cancelled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,
}

/// Errors raised by the pool's auxiliary surfaces (metrics export)
#[derive(Error, Debug)]
pub enum PoolError {
    #[cfg(feature = "metrics")]
    #[error("Prometheus registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metrics encoding failed: {0}")]
    Encoding(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
