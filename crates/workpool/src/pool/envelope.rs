use crate::{action::SharedAction, error::Error};
use core::panic::AssertUnwindSafe;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The outcome of one dispatched action, as reported back to its batch.
pub(crate) type Outcome<E> = Result<(), Error<E>>;

/// A single dispatch: an action paired with its batch context and the sender
/// half of the batch's result channel.
///
/// Consumed exactly once by the worker that dequeues it.
pub(crate) struct Envelope<E> {
    ctx: CancellationToken,
    action: SharedAction<E>,
    response: mpsc::Sender<Outcome<E>>,
}

impl<E> Envelope<E>
where
    E: Send + 'static,
{
    pub(crate) const fn new(
        ctx: CancellationToken,
        action: SharedAction<E>,
        response: mpsc::Sender<Outcome<E>>,
    ) -> Self {
        Self {
            ctx,
            action,
            response,
        }
    }

    /// Runs the action to completion and reports its outcome.
    ///
    /// The action is always started, even if the context is already
    /// cancelled; observing the context is the action's job. A panic is
    /// reported as [`Error::ActionPanicked`] so the batch still receives one
    /// result for this envelope.
    pub(crate) async fn dispatch(self, _worker_id: usize) {
        let Self {
            ctx,
            action,
            response,
        } = self;

        let run = async move { action.execute(ctx).await };
        let outcome = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result.map_err(Error::Action),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_worker_id} caught a panicking action");
                Err(Error::ActionPanicked)
            }
        };

        // The channel holds one slot per envelope of the batch, so it is never
        // full. It is closed only when the submitter abandoned the batch after
        // the pool shut down, in which case the outcome is dropped.
        if let Err(_e) = response.try_send(outcome) {
            #[cfg(feature = "tracing")]
            tracing::trace!("Worker {_worker_id} dropped an outcome: {_e}");
        }
    }
}
