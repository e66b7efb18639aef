use super::envelope::Envelope;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// The receiving half of the dispatch queue, shared by every worker.
pub(crate) type SharedQueue<E> = Arc<Mutex<mpsc::Receiver<Envelope<E>>>>;

/// Worker routine responsible for running queued [`Envelope`]s.
///
/// All workers of a pool drain the same bounded queue: whichever worker is
/// idle takes the next envelope, runs it to completion, reports the outcome,
/// and goes back to waiting. A worker handles one envelope at a time.
///
/// The loop ends when:
/// - `shutdown` is cancelled. This is checked before every dequeue, so a
///   worker never starts another envelope once it has seen the signal.
/// - The queue is closed because every [`Pool`] handle was dropped.
///
/// [`Pool`]: crate::Pool
pub(crate) async fn worker_loop<E>(
    worker_id: usize,
    queue: SharedQueue<E>,
    shutdown: CancellationToken,
) where
    E: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    loop {
        let envelope = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} received shutdown signal");
                break;
            }
            envelope = next_envelope(&queue) => match envelope {
                Some(envelope) => envelope,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Worker {worker_id} queue closed");
                    break;
                }
            },
        };

        envelope.dispatch(worker_id).await;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}

/// Waits for the next envelope. Only one idle worker polls the receiver at a
/// time; the others wait on the lock.
async fn next_envelope<E>(queue: &SharedQueue<E>) -> Option<Envelope<E>> {
    queue.lock().await.recv().await
}
