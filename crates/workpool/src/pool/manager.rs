//! Fixed-size worker pool with fail-closed batch execution.
//!
//! This module defines the [`Pool`] struct, which owns the sending half of a
//! bounded dispatch queue shared by a fixed set of workers. Batches submitted
//! through [`Executor::execute`] are pushed onto that queue one envelope at a
//! time; each envelope carries its own reply channel back to the submitting
//! call.
//!
//! Shutdown is coordinated through a [`CancellationToken`] supplied by the
//! caller at construction. Cancelling it stops every worker and makes any
//! batch that is still enqueuing fail with [`Error::PoolClosed`].

use super::{
    envelope::{Envelope, Outcome},
    worker::{SharedQueue, worker_loop},
};
use crate::{
    action::SharedAction,
    error::{Error, Result},
    executor::Executor,
    spawn_provider::SpawnProvider,
};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// A cooperative pool of workers that runs batches of actions.
///
/// Up to `workers` actions are in flight at once, across every batch sharing
/// the pool. Handles are cheap to clone and all clones feed the same workers.
/// The workers stop when the shutdown token is cancelled or when the last
/// handle is dropped.
pub struct Pool<E> {
    queue: mpsc::Sender<Envelope<E>>,
    shutdown: CancellationToken,
    workers: usize,
}

impl<E> Clone for Pool<E> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            shutdown: self.shutdown.clone(),
            workers: self.workers,
        }
    }
}

impl<E> core::fmt::Debug for Pool<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool")
            .field("workers", &self.workers)
            .field("closed", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<E> Pool<E>
where
    E: Send + 'static,
{
    /// Creates a pool of `workers` workers started through `S`.
    ///
    /// If `workers` is zero, the number of logical CPUs is used instead. The
    /// dispatch queue holds `workers` envelopes; producers wait when it is
    /// full.
    ///
    /// Cancelling `shutdown` releases the workers. Batches never cancel it
    /// themselves, so several pools (or other components) may share one
    /// token.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if a worker cannot be started. Workers
    /// that were already running exit once the queue is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `S` panics while starting a worker, e.g. [`TokioSpawn`]
    /// outside of a Tokio runtime.
    ///
    /// [`TokioSpawn`]: crate::TokioSpawn
    pub fn spawn<S: SpawnProvider>(
        workers: usize,
        shutdown: CancellationToken,
    ) -> core::result::Result<Self, S::Error> {
        let workers = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };

        let (tx, rx) = mpsc::channel(workers);
        let queue: SharedQueue<E> = Arc::new(Mutex::new(rx));

        for worker_id in 0..workers {
            S::spawn_worker(
                worker_id,
                worker_loop(worker_id, Arc::clone(&queue), shutdown.clone()),
            )?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Started pool with {workers} workers");

        Ok(Self {
            queue: tx,
            shutdown,
            workers,
        })
    }

    /// Returns the number of workers, which is also the maximum number of
    /// actions running at once.
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Returns `true` once the shutdown token has been cancelled.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Executes `actions` on the pool. See [`Executor::execute`].
    ///
    /// # Errors
    ///
    /// Same as [`Executor::execute`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(actions = actions.len())))]
    pub async fn execute(
        &self,
        ctx: &CancellationToken,
        actions: &[SharedAction<E>],
    ) -> Result<(), E> {
        let qty = actions.len();
        if qty == 0 {
            return Ok(());
        }

        let ctx = ctx.child_token();
        let _cancel_on_exit = ctx.clone().drop_guard();

        let (res_tx, mut res_rx) = mpsc::channel::<Outcome<E>>(qty);

        let mut err = None;
        let mut queued = 0_usize;

        for action in actions {
            let envelope = Envelope::new(ctx.clone(), Arc::clone(action), res_tx.clone());
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Pool closed after enqueuing {queued} of {qty} actions");
                    return Err(Error::PoolClosed);
                }
                () = ctx.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Batch cancelled after enqueuing {queued} of {qty} actions");
                    err = Some(Error::Cancelled);
                    break;
                }
                sent = self.queue.send(envelope) => match sent {
                    Ok(()) => queued += 1,
                    // Every worker is gone, so nothing will drain the queue.
                    Err(_) => return Err(Error::PoolClosed),
                },
            }
        }

        // Only envelopes hold senders from here on. If they are all dropped
        // without reporting, `recv` yields `None` instead of hanging.
        drop(res_tx);

        while queued > 0 {
            let outcome = tokio::select! {
                biased;
                outcome = res_rx.recv() => outcome,
                () = self.shutdown.cancelled() => None,
            };

            let Some(outcome) = outcome else {
                // Queued envelopes will never run: the workers stopped.
                #[cfg(feature = "tracing")]
                tracing::debug!("Pool closed with {queued} outcomes outstanding");
                return Err(err.unwrap_or(Error::PoolClosed));
            };
            queued -= 1;

            if let Err(e) = outcome {
                if err.is_none() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Batch failed with {queued} outcomes outstanding, cancelling");
                    err = Some(e);
                    ctx.cancel();
                }
            }
        }

        err.map_or(Ok(()), Err)
    }
}

impl<E> Executor<E> for Pool<E>
where
    E: Send + 'static,
{
    fn execute(
        &self,
        ctx: &CancellationToken,
        actions: &[SharedAction<E>],
    ) -> impl Future<Output = Result<(), E>> + Send {
        Pool::execute(self, ctx, actions)
    }
}
