use crate::config::RunConfig;
use futures::StreamExt;
use portable_atomic::{AtomicU64, Ordering};
use rand::Rng;
use core::time::Duration;
use std::time::Instant;
use workpool::{CancellationToken, Error, Pool, SharedAction, action_fn};

/// Errors produced by synthetic actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("injected failure in batch {batch}, action {action}")]
    Injected { batch: usize, action: usize },

    #[error("action aborted by cancellation")]
    Aborted,
}

/// Batch outcome tallies.
#[derive(Debug, Default)]
pub struct Summary {
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    closed: AtomicU64,
}

impl Summary {
    pub fn record(&self, res: &workpool::Result<(), LoadError>) {
        let counter = match res {
            Ok(()) => &self.succeeded,
            Err(Error::Cancelled) => &self.cancelled,
            Err(Error::PoolClosed) => &self.closed,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }
}

/// Builds one batch of sleeping actions. Delays and failures are drawn up
/// front so every action behaves the same if it is ever re-run.
pub fn synthetic_batch(batch: usize, config: &RunConfig) -> Vec<SharedAction<LoadError>> {
    let mut rng = rand::rng();

    (0..config.batch_size)
        .map(|action| {
            let delay = rng.random_range(config.min_delay..=config.max_delay);
            let fail = rng.random_bool(config.failure_rate);

            action_fn(move |ctx: CancellationToken| async move {
                tokio::select! {
                    () = ctx.cancelled() => Err(LoadError::Aborted),
                    () = tokio::time::sleep(delay) => {
                        if fail {
                            Err(LoadError::Injected { batch, action })
                        } else {
                            Ok(())
                        }
                    }
                }
            })
        })
        .collect()
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Submits `config.batches` batches, keeping up to `config.concurrency` of
/// them in flight on `pool`.
pub async fn run(pool: &Pool<LoadError>, ctx: &CancellationToken, config: &RunConfig) -> Summary {
    let summary = Summary::default();

    futures::stream::iter(0..config.batches)
        .for_each_concurrent(config.concurrency, |batch| {
            let actions = synthetic_batch(batch, config);
            let summary = &summary;
            async move {
                let start = Instant::now();
                let res = pool.execute(ctx, &actions).await;
                let elapsed_ms = millis(start.elapsed());

                match &res {
                    Ok(()) => tracing::info!(batch, elapsed_ms, "Batch succeeded"),
                    Err(e) => tracing::warn!(batch, elapsed_ms, "Batch failed: {e}"),
                }
                summary.record(&res);
            }
        })
        .await;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(batches: usize, failure_rate: f64) -> RunConfig {
        RunConfig {
            workers: 2,
            batches,
            batch_size: 6,
            concurrency: 2,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(3),
            failure_rate,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn all_batches_succeed_without_failures() {
        let shutdown = CancellationToken::new();
        let pool = Pool::spawn_tokio(2, shutdown.clone());

        let summary = run(&pool, &CancellationToken::new(), &config(4, 0.0)).await;

        assert_eq!(summary.succeeded(), 4);
        assert_eq!(summary.failed(), 0);
        shutdown.cancel();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn certain_failure_fails_every_batch() {
        let shutdown = CancellationToken::new();
        let pool = Pool::spawn_tokio(2, shutdown.clone());

        let summary = run(&pool, &CancellationToken::new(), &config(3, 1.0)).await;

        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.succeeded(), 0);
        shutdown.cancel();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancelled_run_records_cancellations() {
        let shutdown = CancellationToken::new();
        let pool = Pool::spawn_tokio(2, shutdown.clone());
        let ctx = CancellationToken::new();
        ctx.cancel();

        let summary = run(&pool, &ctx, &config(2, 0.0)).await;

        assert_eq!(summary.cancelled(), 2);
        shutdown.cancel();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn closed_pool_records_closures() {
        let shutdown = CancellationToken::new();
        let pool = Pool::spawn_tokio(2, shutdown.clone());
        shutdown.cancel();

        let summary = run(&pool, &CancellationToken::new(), &config(2, 0.0)).await;

        assert_eq!(summary.closed(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_mid_run_closes_in_flight_batches() {
        let shutdown = CancellationToken::new();
        let pool = Pool::spawn_tokio(2, shutdown.clone());
        let config = RunConfig {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(2),
            ..config(2, 0.0)
        };

        let trigger = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                shutdown.cancel();
            })
        };

        let summary = tokio::time::timeout(
            Duration::from_secs(1),
            run(&pool, &shutdown.child_token(), &config),
        )
        .await
        .unwrap();
        trigger.await.unwrap();

        assert_eq!(summary.closed(), 2);
        assert_eq!(summary.cancelled(), 0);
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
