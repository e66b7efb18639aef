use crate::{pool::Pool, spawn_provider::SpawnProvider};
use core::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;

/// An implementation of [`SpawnProvider`] that gives every worker its own OS
/// thread.
///
/// Each thread drives its worker with [`futures::executor::block_on`]. Actions
/// therefore must not rely on a runtime's reactor or timers (no
/// `tokio::time::sleep`); runtime-agnostic futures such as
/// [`CancellationToken::cancelled`] or channel operations are fine.
pub struct ThreadSpawn;
impl SpawnProvider for ThreadSpawn {
    type Error = io::Error;

    fn spawn_worker<F>(worker_id: usize, worker: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        std::thread::Builder::new()
            .name(format!("workpool-worker-{worker_id}"))
            .spawn(move || futures::executor::block_on(worker))
            .map(drop)
            .inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to spawn worker thread {worker_id}: {_e}");
            })
    }
}

impl<E> Pool<E>
where
    E: Send + 'static,
{
    /// Creates a pool whose workers are dedicated OS threads.
    ///
    /// Convenience for [`Pool::spawn`] with [`ThreadSpawn`]. Pair it with
    /// [`ExecutorBlockingExt::execute_blocking`] for fully synchronous use.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create a worker thread.
    ///
    /// [`ExecutorBlockingExt::execute_blocking`]: crate::ExecutorBlockingExt::execute_blocking
    pub fn spawn_threads(workers: usize, shutdown: CancellationToken) -> io::Result<Self> {
        Self::spawn::<ThreadSpawn>(workers, shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ExecutorBlockingExt, SharedAction, action_fn};
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Failed(usize);

    fn counting_actions(n: usize, fail_at: Option<usize>, ran: &Arc<AtomicUsize>) -> Vec<SharedAction<Failed>> {
        (0..n)
            .map(|i| {
                let ran = Arc::clone(ran);
                action_fn(move |_ctx: CancellationToken| {
                    let ran = Arc::clone(&ran);
                    async move {
                        thread::sleep(Duration::from_millis(1));
                        ran.fetch_add(1, Ordering::SeqCst);
                        if fail_at == Some(i) { Err(Failed(i)) } else { Ok(()) }
                    }
                })
            })
            .collect()
    }

    #[test]
    fn blocking_batch_runs_every_action() {
        let shutdown = CancellationToken::new();
        let pool = Pool::<Failed>::spawn_threads(4, shutdown.clone()).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        let actions = counting_actions(32, None, &ran);
        let res = pool.execute_blocking(&CancellationToken::new(), &actions);

        assert_eq!(res, Ok(()));
        assert_eq!(ran.load(Ordering::SeqCst), 32);
        shutdown.cancel();
    }

    #[test]
    fn blocking_batch_reports_failure() {
        let shutdown = CancellationToken::new();
        let pool = Pool::<Failed>::spawn_threads(2, shutdown.clone()).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        let actions = counting_actions(8, Some(5), &ran);
        let res = pool.execute_blocking(&CancellationToken::new(), &actions);

        assert_eq!(res, Err(Error::Action(Failed(5))));
        shutdown.cancel();
    }

    #[test]
    fn surviving_clone_keeps_the_pool_usable() {
        let shutdown = CancellationToken::new();
        let pool = Pool::<Failed>::spawn_threads(2, shutdown.clone()).unwrap();
        let clone = pool.clone();
        drop(pool);

        let ran = Arc::new(AtomicUsize::new(0));
        let actions = counting_actions(4, None, &ran);
        assert_eq!(clone.execute_blocking(&CancellationToken::new(), &actions), Ok(()));
        assert_eq!(ran.load(Ordering::SeqCst), 4);
        shutdown.cancel();
    }
}
