//! Log output for the load driver.
//!
//! Events from the driver and from `workpool` (built with its `tracing`
//! feature) are printed to the console through `tracing_subscriber::fmt`. The
//! level is taken from `RUST_LOG` and defaults to `info`; use
//! `RUST_LOG=workpool=trace` to follow individual workers.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
