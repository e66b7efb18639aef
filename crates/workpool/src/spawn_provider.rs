use core::future::Future;

/// A trait that abstracts over how worker routines are started.
///
/// This allows the pool to be generic over runtimes like `Tokio` or `Smol`, or
/// to run each worker on its own OS thread.
pub trait SpawnProvider {
    /// Error returned when a worker cannot be started. Providers that cannot
    /// fail use [`core::convert::Infallible`].
    type Error;

    /// Starts `worker` in the background. The routine runs until the pool
    /// shuts down; nothing joins it.
    ///
    /// `worker_id` is a stable index in `0..workers`, used for naming and
    /// logs.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the worker could not be started.
    fn spawn_worker<F>(worker_id: usize, worker: F) -> Result<(), Self::Error>
    where
        F: Future<Output = ()> + Send + 'static;
}
