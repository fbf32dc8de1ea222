//! Message ids, outgoing encoders and incoming decoders.
//!
//! Field layouts vary with the server version negotiated at handshake; the
//! thresholds below gate each optional field.

use super::wire::{FieldReader, FieldWriter};
use super::{GatewayError, HistoricalBarsRequest};
use crate::{Bar, UtcDateTime};

/// Client protocol version range offered during the handshake.
pub const CLIENT_MIN_VERSION: i32 = 100;
pub const CLIENT_MAX_VERSION: i32 = 176;

pub mod server_version {
    pub const TRADING_CLASS: i32 = 68;
    pub const LINKING: i32 = 70;
    pub const OPTIONAL_CAPABILITIES: i32 = 72;
    pub const SYNT_REALTIME_BARS: i32 = 124;
}

pub mod outgoing {
    pub const REQ_HISTORICAL_DATA: i32 = 20;
    pub const CANCEL_HISTORICAL_DATA: i32 = 25;
    pub const START_API: i32 = 71;
}

pub mod incoming {
    pub const ERR_MSG: i32 = 4;
    pub const NEXT_VALID_ID: i32 = 9;
    pub const MANAGED_ACCTS: i32 = 15;
    pub const HISTORICAL_DATA: i32 = 17;
}

/// Request id used by the gateway for notices not tied to a request.
pub const NO_REQUEST: i64 = -1;

/// `formatDate=2`: epoch seconds for intraday bars, `yyyymmdd` otherwise.
const FORMAT_DATE_EPOCH: i32 = 2;

/// Gateway error or notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub req_id: i64,
    pub code: i32,
    pub message: String,
}

impl ErrorNotice {
    /// Farm status and warnings the gateway sends as "errors", with or
    /// without a request id.
    pub fn is_informational(&self) -> bool {
        (2100..=2199).contains(&self.code)
    }

    /// Code 162 doubles as "no data in window", which is an empty result.
    pub fn is_no_data(&self) -> bool {
        self.code == 162 && self.message.to_ascii_lowercase().contains("returned no data")
    }

    /// Codes that mean the session itself is unusable.
    pub fn is_connection_level(&self) -> bool {
        matches!(self.code, 326 | 502 | 504 | 507 | 1100 | 1300)
    }

    pub fn into_error(self) -> GatewayError {
        if self.is_connection_level() {
            GatewayError::connection(self.message).with_code(self.code)
        } else {
            GatewayError::request(self.code, self.message)
        }
    }
}

/// Decoded incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Error(ErrorNotice),
    NextValidId(i64),
    ManagedAccounts(String),
    /// Complete bar list for `req_id`.
    HistoricalData { req_id: i64, bars: Vec<Bar> },
    Other(i32),
}

pub fn encode_start_api(server_version: i32, client_id: i32) -> Vec<u8> {
    let mut writer = FieldWriter::new();
    writer.push(outgoing::START_API).push(2).push(client_id);
    if server_version >= server_version::OPTIONAL_CAPABILITIES {
        writer.push_empty();
    }
    writer.into_frame()
}

pub fn encode_historical_request(
    server_version: i32,
    req_id: i64,
    req: &HistoricalBarsRequest,
) -> Vec<u8> {
    let contract = &req.contract;
    let mut writer = FieldWriter::new();

    writer.push(outgoing::REQ_HISTORICAL_DATA);
    if server_version < server_version::SYNT_REALTIME_BARS {
        writer.push(6);
    }
    writer.push(req_id);

    if server_version >= server_version::TRADING_CLASS {
        writer.push(0); // conId
    }
    writer
        .push(contract.symbol.as_str())
        .push(contract.sec_type.as_str())
        .push_empty() // lastTradeDateOrContractMonth
        .push_f64(0.0) // strike
        .push_empty() // right
        .push_empty() // multiplier
        .push(&contract.exchange)
        .push_empty() // primaryExchange
        .push(&contract.currency)
        .push_empty(); // localSymbol
    if server_version >= server_version::TRADING_CLASS {
        writer.push_empty();
    }
    writer.push_bool(false); // includeExpired

    writer
        .push(req.end.format_gateway_end())
        .push(req.bar_size.as_str())
        .push(req.duration)
        .push_bool(req.regular_hours_only)
        .push(req.what_to_show.as_str())
        .push(FORMAT_DATE_EPOCH);

    if server_version >= server_version::SYNT_REALTIME_BARS {
        writer.push_bool(false); // keepUpToDate
    }
    if server_version >= server_version::LINKING {
        writer.push_empty(); // chartOptions
    }

    writer.into_frame()
}

pub fn encode_cancel_historical(req_id: i64) -> Vec<u8> {
    let mut writer = FieldWriter::new();
    writer
        .push(outgoing::CANCEL_HISTORICAL_DATA)
        .push(1)
        .push(req_id);
    writer.into_frame()
}

pub fn decode(server_version: i32, fields: &[String]) -> Result<Incoming, GatewayError> {
    let mut reader = FieldReader::new(fields);
    let msg_id = reader.next_i32()?;

    match msg_id {
        incoming::ERR_MSG => decode_error(&mut reader).map(Incoming::Error),
        incoming::NEXT_VALID_ID => {
            reader.skip()?;
            reader.next_i64().map(Incoming::NextValidId)
        }
        incoming::MANAGED_ACCTS => {
            reader.skip()?;
            reader
                .next_str()
                .map(|accounts| Incoming::ManagedAccounts(accounts.to_owned()))
        }
        incoming::HISTORICAL_DATA => decode_historical_data(server_version, &mut reader),
        other => Ok(Incoming::Other(other)),
    }
}

fn decode_error(reader: &mut FieldReader<'_>) -> Result<ErrorNotice, GatewayError> {
    reader.skip()?; // version
    Ok(ErrorNotice {
        req_id: reader.next_i64()?,
        code: reader.next_i32()?,
        message: reader.next_str()?.to_owned(),
    })
}

fn decode_historical_data(
    server_version: i32,
    reader: &mut FieldReader<'_>,
) -> Result<Incoming, GatewayError> {
    if server_version < server_version::SYNT_REALTIME_BARS {
        reader.skip()?;
    }
    let req_id = reader.next_i64()?;
    reader.skip()?; // start date
    reader.skip()?; // end date

    let count = reader.next_i64()?;
    let count = usize::try_from(count)
        .map_err(|_| GatewayError::protocol(format!("negative bar count {count}")))?;

    // Each bar needs at least eight fields; bound the allocation by what arrived.
    let mut bars = Vec::with_capacity(count.min(reader.remaining() / 8));
    for _ in 0..count {
        let raw_date = reader.next_str()?;
        let date = UtcDateTime::from_gateway_bar_date(raw_date).map_err(|_| {
            GatewayError::protocol(format!("unrecognized bar date '{raw_date}'"))
        })?;
        let open = reader.next_f64()?;
        let high = reader.next_f64()?;
        let low = reader.next_f64()?;
        let close = reader.next_f64()?;
        let volume = reader.next_f64()?;
        let average = reader.next_f64()?;
        if server_version < server_version::SYNT_REALTIME_BARS {
            reader.skip()?; // hasGaps
        }
        let bar_count = reader.next_i64()?;

        bars.push(Bar::new(date, open, high, low, close, volume, average, bar_count));
    }

    Ok(Incoming::HistoricalData { req_id, bars })
}
