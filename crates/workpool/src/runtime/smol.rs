use crate::{pool::Pool, spawn_provider::SpawnProvider};
use core::{convert::Infallible, future::Future};
use tokio_util::sync::CancellationToken;

/// An implementation of [`SpawnProvider`] using Smol's global executor.
///
/// Workers are detached tasks; they live until the pool shuts down.
pub struct SmolSpawn;
impl SpawnProvider for SmolSpawn {
    type Error = Infallible;

    fn spawn_worker<F>(_worker_id: usize, worker: F) -> Result<(), Self::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        smol::spawn(worker).detach();
        Ok(())
    }
}

impl<E> Pool<E>
where
    E: Send + 'static,
{
    /// Creates a pool whose workers are tasks on Smol's global executor.
    ///
    /// Convenience for [`Pool::spawn`] with [`SmolSpawn`].
    pub fn spawn_smol(workers: usize, shutdown: CancellationToken) -> Self {
        match Self::spawn::<SmolSpawn>(workers, shutdown) {
            Ok(pool) => pool,
            Err(never) => match never {},
        }
    }
}
