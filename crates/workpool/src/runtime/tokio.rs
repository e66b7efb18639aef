use crate::{pool::Pool, spawn_provider::SpawnProvider};
use core::{convert::Infallible, future::Future};
use tokio_util::sync::CancellationToken;

/// An implementation of [`SpawnProvider`] using Tokio tasks.
///
/// This is the default provider for use in async applications built on Tokio.
/// Workers are spawned onto the runtime of the calling context.
pub struct TokioSpawn;
impl SpawnProvider for TokioSpawn {
    type Error = Infallible;

    fn spawn_worker<F>(_worker_id: usize, worker: F) -> Result<(), Self::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(worker);
        Ok(())
    }
}

impl<E> Pool<E>
where
    E: Send + 'static,
{
    /// Creates a pool whose workers are Tokio tasks.
    ///
    /// Convenience for [`Pool::spawn`] with [`TokioSpawn`].
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn_tokio(workers: usize, shutdown: CancellationToken) -> Self {
        match Self::spawn::<TokioSpawn>(workers, shutdown) {
            Ok(pool) => pool,
            Err(never) => match never {},
        }
    }
}
