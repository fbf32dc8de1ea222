use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

/// One historical bar as delivered by the gateway.
///
/// Field order is the column order of the output file. `volume` is `-1` for
/// instruments without reported volume (indexes); `average` and `bar_count`
/// are the gateway's VWAP and trade count for the bar. Values are kept as
/// received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub average: f64,
    #[serde(rename = "barCount")]
    pub bar_count: i64,
}

impl Bar {
    /// Column names in file order.
    pub const COLUMNS: [&'static str; 8] = [
        "date", "open", "high", "low", "close", "volume", "average", "barCount",
    ];

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        average: f64,
        bar_count: i64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            average,
            bar_count,
        }
    }
}
