//! Resource factories supplied by the caller

use crate::context::Context;

use async_trait::async_trait;
use std::future::Future;
use std::hash::Hash;

/// Creates new resources when the idle set has nothing to offer.
///
/// The pool calls `create` synchronously while holding its lock, at most
/// once per `acquire`. A factory must not call back into the same pool.
///
/// Any `Fn(&Context) -> Result<T, E>` closure is a factory:
///
/// ```
/// use idlepool::{Context, Pool, PoolConfiguration};
///
/// let pool = Pool::new(
///     |_ctx: &Context| -> Result<u64, std::io::Error> { Ok(7) },
///     PoolConfiguration::default(),
/// );
/// assert_eq!(pool.acquire(&Context::new()).unwrap(), 7);
/// ```
pub trait Factory: Send + Sync + 'static {
    /// Identity-comparable handle; the pool keeps one clone as a map key
    type Resource: Eq + Hash + Clone + Send + 'static;
    type Error;

    fn create(&self, ctx: &Context) -> Result<Self::Resource, Self::Error>;
}

impl<T, E, F> Factory for F
where
    F: Fn(&Context) -> Result<T, E> + Send + Sync + 'static,
    T: Eq + Hash + Clone + Send + 'static,
{
    type Resource = T;
    type Error = E;

    fn create(&self, ctx: &Context) -> Result<T, E> {
        self(ctx)
    }
}

/// Async counterpart of [`Factory`], used by [`AsyncPool`](crate::AsyncPool).
///
/// Closures taking an owned `Context` and returning a future qualify.
#[async_trait]
pub trait AsyncFactory: Send + Sync + 'static {
    type Resource: Eq + Hash + Clone + Send + 'static;
    type Error: Send;

    async fn create(&self, ctx: &Context) -> Result<Self::Resource, Self::Error>;
}

#[async_trait]
impl<T, E, F, Fut> AsyncFactory for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Eq + Hash + Clone + Send + 'static,
    E: Send + 'static,
{
    type Resource = T;
    type Error = E;

    async fn create(&self, ctx: &Context) -> Result<T, E> {
        self(ctx.clone()).await
    }
}
