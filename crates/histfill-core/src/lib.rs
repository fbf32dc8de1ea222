//! # Histfill Core
//!
//! Chunked historical bar backfill from a market-data gateway.
//!
//! ## Overview
//!
//! - **Gateway session** speaking the socket protocol: handshake, historical
//!   requests, per-request timeout with cancellation
//! - **Query window** walking backward from "now" one day per request
//! - **Result table** that prepends each chunk as it arrives
//! - **CSV sink** writing the table atomically
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`backfill`] | Driver loop and end-to-end run |
//! | [`config`] | Run configuration and defaults |
//! | [`domain`] | Contract, bar, request parameters, timestamps |
//! | [`error`] | Validation and run errors |
//! | [`gateway`] | Gateway session and the [`HistoricalSource`] seam |
//! | [`retry`] | Retry policy for timed-out requests |
//! | [`sink`] | CSV output |
//! | [`table`] | Accumulated rows |
//! | [`window`] | Backward stepping over the horizon |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use histfill_core::{backfill, BackfillConfig, UtcDateTime};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), histfill_core::BackfillError> {
//!     let summary = backfill::run(&BackfillConfig::default(), UtcDateTime::now()).await?;
//!     println!("{} rows written to {}", summary.rows, summary.output.display());
//!     Ok(())
//! }
//! ```

pub mod backfill;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod retry;
pub mod sink;
pub mod table;
pub mod window;

pub use backfill::{BackfillOutcome, BackfillPlan, RunSummary, PREVIEW_ROWS};
pub use config::{BackfillConfig, DEFAULT_HORIZON_DAYS, DEFAULT_OUTPUT};
pub use domain::*;
pub use error::{BackfillError, ValidationError};
pub use gateway::{
    GatewayError, GatewayErrorKind, GatewaySession, HistoricalBarsRequest, HistoricalSource,
    SessionConfig,
};
pub use retry::{Backoff, RetryPolicy};
pub use sink::{read_csv, CsvSink, SinkError};
pub use table::ResultTable;
pub use window::QueryWindow;
