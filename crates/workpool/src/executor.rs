use crate::{action::SharedAction, error::Result};
use core::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs batches of actions with fail-closed semantics.
///
/// An executor resolves a batch once every dispatched action has reported, or
/// as soon as the batch can no longer succeed. The first error observed (by
/// detection order, not submission order) is returned and cancels the batch
/// context so that actions still running get a chance to stop early. No
/// further actions from a failed batch are started.
pub trait Executor<E> {
    /// Executes `actions` under a context derived from `ctx`.
    ///
    /// Returns `Ok(())` only if every action succeeded and the batch was never
    /// cancelled. An empty batch resolves immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if the executor shut down while enqueuing.
    /// - [`Error::Cancelled`] if `ctx` was cancelled before every action was
    ///   queued.
    /// - [`Error::ActionPanicked`] if an action panicked.
    /// - [`Error::Action`] with the first error returned by an action.
    ///
    /// [`Error::PoolClosed`]: crate::Error::PoolClosed
    /// [`Error::Cancelled`]: crate::Error::Cancelled
    /// [`Error::ActionPanicked`]: crate::Error::ActionPanicked
    /// [`Error::Action`]: crate::Error::Action
    fn execute(
        &self,
        ctx: &CancellationToken,
        actions: &[SharedAction<E>],
    ) -> impl Future<Output = Result<(), E>> + Send;
}

/// Extension trait for driving an [`Executor`] from synchronous code.
pub trait ExecutorBlockingExt<E>: Executor<E> {
    /// Executes `actions` and blocks the current thread until the batch
    /// resolves.
    ///
    /// The batch future is driven with [`futures::executor::block_on`], so the
    /// workers must run elsewhere: a [`ThreadSpawn`] pool, or a runtime other
    /// than the calling thread. Calling this from inside an async task stalls
    /// that task's runtime thread.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::execute`].
    ///
    /// [`ThreadSpawn`]: crate::ThreadSpawn
    fn execute_blocking(&self, ctx: &CancellationToken, actions: &[SharedAction<E>]) -> Result<(), E> {
        futures::executor::block_on(self.execute(ctx, actions))
    }
}

impl<X, E> ExecutorBlockingExt<E> for X where X: Executor<E> {}
