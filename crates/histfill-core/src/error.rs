use thiserror::Error;

use crate::gateway::GatewayError;
use crate::sink::SinkError;

/// Validation errors for domain values and run parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("exchange cannot be empty")]
    EmptyExchange,
    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("invalid bar size '{value}', expected a gateway setting such as '5 mins' or '1 day'")]
    InvalidBarSize { value: String },
    #[error("invalid data kind '{value}', expected one of TRADES, MIDPOINT, BID, ASK, BID_ASK")]
    InvalidWhatToShow { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp is out of the representable range")]
    TimestampOutOfRange,

    #[error("horizon must be greater than zero")]
    EmptyHorizon,
    #[error("window step must be greater than zero")]
    EmptyStep,
}

/// Top-level error for a backfill run.
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
