use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Bar size settings accepted by the historical data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarSize {
    #[serde(rename = "1 secs")]
    OneSecond,
    #[serde(rename = "5 secs")]
    FiveSeconds,
    #[serde(rename = "30 secs")]
    ThirtySeconds,
    #[serde(rename = "1 min")]
    OneMinute,
    #[serde(rename = "5 mins")]
    FiveMinutes,
    #[serde(rename = "15 mins")]
    FifteenMinutes,
    #[serde(rename = "30 mins")]
    ThirtyMinutes,
    #[serde(rename = "1 hour")]
    OneHour,
    #[serde(rename = "1 day")]
    OneDay,
    #[serde(rename = "1 week")]
    OneWeek,
    #[serde(rename = "1 month")]
    OneMonth,
}

impl BarSize {
    pub const ALL: [Self; 11] = [
        Self::OneSecond,
        Self::FiveSeconds,
        Self::ThirtySeconds,
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    /// Spelling used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneSecond => "1 secs",
            Self::FiveSeconds => "5 secs",
            Self::ThirtySeconds => "30 secs",
            Self::OneMinute => "1 min",
            Self::FiveMinutes => "5 mins",
            Self::FifteenMinutes => "15 mins",
            Self::ThirtyMinutes => "30 mins",
            Self::OneHour => "1 hour",
            Self::OneDay => "1 day",
            Self::OneWeek => "1 week",
            Self::OneMonth => "1 month",
        }
    }

    const fn short(self) -> &'static str {
        match self {
            Self::OneSecond => "1s",
            Self::FiveSeconds => "5s",
            Self::ThirtySeconds => "30s",
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1mo",
        }
    }
}

impl Display for BarSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarSize {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.split_whitespace().collect::<Vec<_>>().join(" ");
        let needle = needle.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == needle || size.short() == needle)
            .ok_or_else(|| ValidationError::InvalidBarSize {
                value: value.to_owned(),
            })
    }
}

/// Unit of a gateway duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Seconds,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    const fn code(self) -> char {
        match self {
            Self::Seconds => 'S',
            Self::Days => 'D',
            Self::Weeks => 'W',
            Self::Months => 'M',
            Self::Years => 'Y',
        }
    }
}

/// Lookback span of one request, e.g. `1 D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DurationSpec {
    pub count: u32,
    pub unit: DurationUnit,
}

impl DurationSpec {
    pub const fn days(count: u32) -> Self {
        Self {
            count,
            unit: DurationUnit::Days,
        }
    }
}

impl Display for DurationSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.count, self.unit.code())
    }
}

/// Price series requested from the historical data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WhatToShow {
    Trades,
    Midpoint,
    Bid,
    Ask,
    BidAsk,
    HistoricalVolatility,
    OptionImpliedVolatility,
}

impl WhatToShow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trades => "TRADES",
            Self::Midpoint => "MIDPOINT",
            Self::Bid => "BID",
            Self::Ask => "ASK",
            Self::BidAsk => "BID_ASK",
            Self::HistoricalVolatility => "HISTORICAL_VOLATILITY",
            Self::OptionImpliedVolatility => "OPTION_IMPLIED_VOLATILITY",
        }
    }
}

impl Display for WhatToShow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhatToShow {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRADES" => Ok(Self::Trades),
            "MIDPOINT" => Ok(Self::Midpoint),
            "BID" => Ok(Self::Bid),
            "ASK" => Ok(Self::Ask),
            "BID_ASK" => Ok(Self::BidAsk),
            "HISTORICAL_VOLATILITY" => Ok(Self::HistoricalVolatility),
            "OPTION_IMPLIED_VOLATILITY" => Ok(Self::OptionImpliedVolatility),
            _ => Err(ValidationError::InvalidWhatToShow {
                value: value.to_owned(),
            }),
        }
    }
}
