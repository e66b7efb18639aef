mod config;
mod load;
mod telemetry;

use clap::Parser;
use config::{CliArgs, RunConfig};
use std::time::Instant;
use telemetry::init_telemetry;
use tokio::signal;
use workpool::{CancellationToken, Pool};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;

    let shutdown = CancellationToken::new();
    let pool = Pool::spawn_tokio(config.workers, shutdown.clone());
    log_startup_info(&config, pool.workers());

    // Signals close the pool: in-flight batches fail with `PoolClosed`. The
    // run context is a child of the shutdown token so running actions abort
    // as well.
    tokio::spawn(cancel_on_signal(shutdown.clone()));
    let ctx = shutdown.child_token();

    let start = Instant::now();
    let summary = load::run(&pool, &ctx, &config).await;
    shutdown.cancel();

    tracing::info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        cancelled = summary.cancelled(),
        pool_closed = summary.closed(),
        elapsed_ms = load::millis(start.elapsed()),
        "Run complete"
    );

    Ok(())
}

fn log_startup_info(config: &RunConfig, workers: usize) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting load run with {workers} workers and full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting load run: {} batches of {} actions on {workers} workers",
            config.batches,
            config.batch_size
        );
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = shutdown.cancelled() => return,
    }

    tracing::info!("Closing the pool...");
    shutdown.cancel();
}
