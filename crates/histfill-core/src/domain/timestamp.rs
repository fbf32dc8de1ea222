use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Explicit-UTC end-date form understood by the gateway (`20240105-21:00:00`).
const GATEWAY_END_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]-[hour]:[minute]:[second]");

/// Date-only form used for daily and larger bars (`20240105`).
const GATEWAY_DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]");

/// Timestamp guaranteed to carry a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| {
            ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            }
        })?;

        if parsed.offset() != UtcOffset::UTC {
            return Err(ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            });
        }

        Ok(Self(parsed))
    }

    pub fn from_unix_seconds(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|_| ValidationError::TimestampOutOfRange)
    }

    /// Parses a bar date as reported with `formatDate=2`: epoch seconds for
    /// intraday bars, `yyyymmdd` for daily and larger bars.
    pub fn from_gateway_bar_date(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.len() == 8 {
            if let Ok(date) = Date::parse(trimmed, GATEWAY_DATE_FORMAT) {
                return Ok(Self(date.midnight().assume_utc()));
            }
        }

        trimmed
            .parse::<i64>()
            .map_err(|_| ValidationError::TimestampNotUtc {
                value: input.to_owned(),
            })
            .and_then(Self::from_unix_seconds)
    }

    pub fn checked_sub(self, step: Duration) -> Option<Self> {
        self.0.checked_sub(step).map(Self)
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn unix_seconds(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn format_gateway_end(self) -> String {
        self.0
            .format(GATEWAY_END_FORMAT)
            .unwrap_or_else(|_| self.unix_seconds().to_string())
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.unix_seconds().to_string())
    }
}

impl From<OffsetDateTime> for UtcDateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
