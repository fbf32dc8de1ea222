//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Contract`] | Instrument reference (symbol, security type, venue, currency) |
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`Bar`] | One historical bar with gateway metadata |
//! | [`BarSize`] | Bar size setting (`5 mins`, `1 day`, ...) |
//! | [`DurationSpec`] | Lookback span of one request (`1 D`) |
//! | [`WhatToShow`] | Requested price series (`TRADES`, `MIDPOINT`, ...) |
//! | [`UtcDateTime`] | UTC timestamp with gateway and RFC3339 formatting |

mod bar;
mod contract;
mod params;
mod timestamp;

pub use bar::Bar;
pub use contract::{validate_currency_code, Contract, SecurityType, Symbol};
pub use params::{BarSize, DurationSpec, DurationUnit, WhatToShow};
pub use timestamp::UtcDateTime;
