//! CLI argument definitions for histfill.
//!
//! Every option defaults to the standard job, so a bare `histfill` downloads
//! ten years of 5-minute VIX bars from a gateway on localhost.
//!
//! # Options
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--host` | `HISTFILL_HOST` | `127.0.0.1` |
//! | `--port` | `HISTFILL_PORT` | `4002` |
//! | `--client-id` | `HISTFILL_CLIENT_ID` | `5` |
//! | `--symbol` | | `VIX` |
//! | `--exchange` | | `CBOE` |
//! | `--currency` | | `USD` |
//! | `--horizon-days` | | `3650` |
//! | `--bar-size` | | `5 mins` |
//! | `--what-to-show` | | `TRADES` |
//! | `--rth-only` | | `false` |
//! | `--output` | | `VIX_5min_data.csv` |
//! | `--timeout-ms` | | `120000` |
//! | `--max-retries` | | `0` |
//! | `--format` | | `table` |
//!
//! # Examples
//!
//! ```bash
//! # Standard run
//! histfill
//!
//! # One year of daily SPX bars, regular hours only
//! histfill --symbol SPX --horizon-days 365 --bar-size "1 day" --rth-only \
//!     --output SPX_daily.csv
//!
//! # Retry timed-out requests twice and print the summary as JSON
//! histfill --max-retries 2 --format json --pretty
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use histfill_core::{
    BackfillConfig, BarSize, Contract, RetryPolicy, SecurityType, SessionConfig, Symbol,
    ValidationError, WhatToShow, DEFAULT_HORIZON_DAYS, DEFAULT_OUTPUT,
};

/// Backfill historical bars from a market-data gateway into a CSV file.
#[derive(Debug, Parser)]
#[command(
    name = "histfill",
    author,
    version,
    about = "Backfill historical bars from a market-data gateway into CSV"
)]
pub struct Cli {
    /// Gateway host.
    #[arg(long, env = "HISTFILL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Gateway API port.
    #[arg(long, env = "HISTFILL_PORT", default_value_t = 4002)]
    pub port: u16,

    /// API client id; must not be in use by another session.
    #[arg(long, env = "HISTFILL_CLIENT_ID", default_value_t = 5)]
    pub client_id: i32,

    /// Index symbol to download.
    #[arg(long, default_value = "VIX")]
    pub symbol: String,

    /// Listing exchange.
    #[arg(long, default_value = "CBOE")]
    pub exchange: String,

    /// Contract currency (ISO code).
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Days of history to walk back from now.
    #[arg(
        long,
        default_value_t = DEFAULT_HORIZON_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=36_500)
    )]
    pub horizon_days: i64,

    /// Bar size setting, e.g. "5 mins", "1 hour", "1 day".
    #[arg(long, default_value = "5 mins")]
    pub bar_size: BarSize,

    /// Price series to request.
    #[arg(long, default_value = "TRADES")]
    pub what_to_show: WhatToShow,

    /// Restrict bars to regular trading hours.
    #[arg(long, default_value_t = false)]
    pub rth_only: bool,

    /// Destination CSV file; replaced if it exists.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Per-request timeout in milliseconds; 0 waits indefinitely.
    #[arg(long, default_value_t = 120_000)]
    pub timeout_ms: u64,

    /// Retries for a timed-out request. Gateway rejections are never retried.
    #[arg(long, default_value_t = 0)]
    pub max_retries: u32,

    /// Format of the summary printed after saving.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON object.
    Json,
}

impl Cli {
    /// Validates the arguments into a run configuration.
    pub fn to_config(&self) -> Result<BackfillConfig, ValidationError> {
        let contract = Contract::new(
            Symbol::parse(&self.symbol)?,
            SecurityType::Index,
            &self.exchange,
            &self.currency,
        )?;

        Ok(BackfillConfig {
            session: SessionConfig {
                host: self.host.clone(),
                port: self.port,
                client_id: self.client_id,
                timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            },
            contract,
            horizon: time::Duration::days(self.horizon_days),
            bar_size: self.bar_size,
            what_to_show: self.what_to_show,
            regular_hours_only: self.rth_only,
            output: self.output.clone(),
            retry: RetryPolicy::exponential(self.max_retries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["histfill"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn no_arguments_reproduce_the_default_job() {
        let config = parse(&[]).to_config().expect("config");
        let expected = BackfillConfig::default();

        assert_eq!(config.contract, expected.contract);
        assert_eq!(config.horizon, expected.horizon);
        assert_eq!(config.bar_size, expected.bar_size);
        assert_eq!(config.what_to_show, expected.what_to_show);
        assert_eq!(config.output, expected.output);
        assert_eq!(config.retry, expected.retry);
        assert_eq!(config.session.timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn overrides_flow_into_config() {
        let cli = parse(&[
            "--symbol",
            "spx",
            "--horizon-days",
            "30",
            "--bar-size",
            "1 day",
            "--what-to-show",
            "midpoint",
            "--rth-only",
            "--timeout-ms",
            "0",
            "--max-retries",
            "3",
            "--format",
            "json",
        ]);
        let config = cli.to_config().expect("config");

        assert_eq!(config.contract.to_string(), "IND SPX@CBOE");
        assert_eq!(config.horizon, time::Duration::days(30));
        assert_eq!(config.bar_size, BarSize::OneDay);
        assert_eq!(config.what_to_show, WhatToShow::Midpoint);
        assert!(config.regular_hours_only);
        assert_eq!(config.session.timeout, None);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_unknown_bar_size_and_zero_horizon() {
        assert!(Cli::try_parse_from(["histfill", "--bar-size", "7 mins"]).is_err());
        assert!(Cli::try_parse_from(["histfill", "--horizon-days", "0"]).is_err());
    }

    #[test]
    fn bad_symbol_is_a_validation_error() {
        let error = parse(&["--symbol", "9X"]).to_config().expect_err("invalid");
        assert_eq!(error, ValidationError::SymbolInvalidStart { ch: '9' });
    }
}
