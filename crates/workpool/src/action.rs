use core::future::Future;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A unit of work that can be run by an [`Executor`].
///
/// An action receives the batch context as a [`CancellationToken`]. The token
/// is cancelled once the batch fails closed, but the pool never interrupts a
/// running action: honouring the token (by polling
/// [`CancellationToken::is_cancelled`] or awaiting
/// [`CancellationToken::cancelled`]) is up to the action.
///
/// Any `Fn(CancellationToken) -> Future<Output = Result<(), E>>` closure is an
/// action, so most callers never implement this trait by hand.
///
/// [`Executor`]: crate::Executor
pub trait Action<E>: Send + Sync + 'static {
    /// Runs the action under `ctx`.
    fn execute(&self, ctx: CancellationToken) -> BoxFuture<'static, Result<(), E>>;
}

impl<E, F, Fut> Action<E> for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    fn execute(&self, ctx: CancellationToken) -> BoxFuture<'static, Result<(), E>> {
        Box::pin(self(ctx))
    }
}

/// A shared, type-erased action as accepted by [`Executor::execute`].
///
/// [`Executor::execute`]: crate::Executor::execute
pub type SharedAction<E> = Arc<dyn Action<E>>;

/// Wraps a closure into a [`SharedAction`].
///
/// # Example
///
/// ```
/// use workpool::{CancellationToken, SharedAction, action_fn};
///
/// let action: SharedAction<std::io::Error> = action_fn(|ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Ok(());
///     }
///     // ... do the work ...
///     Ok(())
/// });
/// # let _ = action;
/// ```
pub fn action_fn<E, F, Fut>(f: F) -> SharedAction<E>
where
    E: 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    Arc::new(f)
}
