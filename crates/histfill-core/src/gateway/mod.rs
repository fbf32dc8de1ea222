//! Market-data gateway client.
//!
//! [`HistoricalSource`] is the seam between the backfill driver and the
//! gateway. [`GatewaySession`] implements it over a TCP session speaking the
//! gateway socket protocol; tests substitute scripted sources.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`wire`] | Frame and field codec |
//! | [`message`] | Message ids, request encoding, reply decoding |
//! | [`session`] | Connected session: handshake, requests, timeouts |

pub mod message;
pub mod session;
pub mod wire;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Bar, BarSize, Contract, DurationSpec, UtcDateTime, WhatToShow};

pub use session::{GatewaySession, SessionConfig};

/// Gateway error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Unreachable gateway, failed handshake, rejected client id, lost link.
    Connection,
    /// Gateway rejected one request (pacing, contract, permissions).
    Request,
    /// No reply within the configured request timeout.
    Timeout,
    /// Malformed frame or field.
    Protocol,
}

/// Structured gateway error carrying the gateway's numeric code when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    message: String,
    code: Option<i32>,
    retryable: bool,
}

impl GatewayError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Connection,
            message: message.into(),
            code: None,
            retryable: false,
        }
    }

    pub fn request(code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Request,
            message: message.into(),
            code: Some(code),
            retryable: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Timeout,
            message: message.into(),
            code: None,
            retryable: true,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Protocol,
            message: message.into(),
            code: None,
            retryable: false,
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub const fn kind(&self) -> GatewayErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn gateway_code(&self) -> Option<i32> {
        self.code
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            GatewayErrorKind::Connection => "gateway.connection",
            GatewayErrorKind::Request => "gateway.request",
            GatewayErrorKind::Timeout => "gateway.timeout",
            GatewayErrorKind::Protocol => "gateway.protocol",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} [{}] ({})", self.message, code, self.code()),
            None => write!(f, "{} ({})", self.message, self.code()),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Parameters of one historical bar request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBarsRequest {
    pub contract: Contract,
    pub end: UtcDateTime,
    pub duration: DurationSpec,
    pub bar_size: BarSize,
    pub what_to_show: WhatToShow,
    pub regular_hours_only: bool,
}

/// One-request-at-a-time historical bar provider.
///
/// An empty `Vec` means the venue had no data in the window and is not an
/// error.
pub trait HistoricalSource: Send {
    fn fetch_bars<'a>(
        &'a mut self,
        req: &'a HistoricalBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Bar>, GatewayError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_gateway_code_when_present() {
        let error = GatewayError::request(162, "pacing violation");
        assert_eq!(error.to_string(), "pacing violation [162] (gateway.request)");
        assert!(!error.retryable());

        let error = GatewayError::timeout("no reply");
        assert_eq!(error.to_string(), "no reply (gateway.timeout)");
        assert!(error.retryable());
    }

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(!GatewayError::connection("socket closed").retryable());
        assert!(!GatewayError::protocol("bad frame").retryable());
        assert!(!GatewayError::request(200, "no security definition").retryable());
        assert!(GatewayError::timeout("slow").retryable());
    }
}
