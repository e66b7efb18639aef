use clap::Parser;
use core::time::Duration;

/// Command-line arguments, each of which may also come from the environment
/// (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Runs synthetic batches against a workpool pool")]
pub struct CliArgs {
    /// Number of pool workers. `0` uses one worker per logical CPU.
    #[arg(long, env = "WORKPOOL_WORKERS", default_value_t = 0)]
    pub workers: usize,

    /// Total number of batches to submit.
    #[arg(long, env = "WORKPOOL_BATCHES", default_value_t = 8)]
    pub batches: usize,

    /// Number of actions per batch.
    #[arg(long, env = "WORKPOOL_BATCH_SIZE", default_value_t = 64)]
    pub batch_size: usize,

    /// Number of batches in flight at once, all sharing the same pool.
    #[arg(long, env = "WORKPOOL_CONCURRENCY", default_value_t = 2)]
    pub concurrency: usize,

    /// Lower bound of the simulated work per action, in milliseconds.
    #[arg(long, env = "WORKPOOL_MIN_DELAY_MS", default_value_t = 1)]
    pub min_delay_ms: u64,

    /// Upper bound of the simulated work per action, in milliseconds.
    #[arg(long, env = "WORKPOOL_MAX_DELAY_MS", default_value_t = 10)]
    pub max_delay_ms: u64,

    /// Probability in `[0, 1]` that an action fails.
    #[arg(long, env = "WORKPOOL_FAILURE_RATE", default_value_t = 0.0)]
    pub failure_rate: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be greater than 0")]
    Zero { name: &'static str },

    #[error("min delay ({min}ms) exceeds max delay ({max}ms)")]
    DelayRange { min: u64, max: u64 },

    #[error("failure rate {0} is outside [0, 1]")]
    FailureRate(f64),
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workers: usize,
    pub batches: usize,
    pub batch_size: usize,
    pub concurrency: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub failure_rate: f64,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        for (name, value) in [
            ("batches", args.batches),
            ("batch size", args.batch_size),
            ("concurrency", args.concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        if args.min_delay_ms > args.max_delay_ms {
            return Err(ConfigError::DelayRange {
                min: args.min_delay_ms,
                max: args.max_delay_ms,
            });
        }

        if !(0.0..=1.0).contains(&args.failure_rate) {
            return Err(ConfigError::FailureRate(args.failure_rate));
        }

        Ok(Self {
            workers: args.workers,
            batches: args.batches,
            batch_size: args.batch_size,
            concurrency: args.concurrency.min(args.batches),
            min_delay: Duration::from_millis(args.min_delay_ms),
            max_delay: Duration::from_millis(args.max_delay_ms),
            failure_rate: args.failure_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<RunConfig, ConfigError> {
        let args = CliArgs::try_parse_from(std::iter::once("workpool-cli").chain(extra.iter().copied())).unwrap();
        RunConfig::try_from(args)
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.min_delay, Duration::from_millis(1));
        assert_eq!(config.max_delay, Duration::from_millis(10));
    }

    #[test]
    fn concurrency_is_capped_by_batches() {
        let config = parse(&["--batches", "3", "--concurrency", "10"]).unwrap();
        assert_eq!(config.concurrency, 3);
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert_eq!(
            parse(&["--batch-size", "0"]).unwrap_err(),
            ConfigError::Zero { name: "batch size" }
        );
    }

    #[test]
    fn rejects_inverted_delay_range() {
        assert_eq!(
            parse(&["--min-delay-ms", "20", "--max-delay-ms", "5"]).unwrap_err(),
            ConfigError::DelayRange { min: 20, max: 5 }
        );
    }

    #[test]
    fn rejects_out_of_range_failure_rate() {
        assert_eq!(
            parse(&["--failure-rate", "1.5"]).unwrap_err(),
            ConfigError::FailureRate(1.5)
        );
    }
}
