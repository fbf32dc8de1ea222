//! Run configuration.

use std::path::PathBuf;

use time::Duration;

use crate::backfill::BackfillPlan;
use crate::{
    BarSize, Contract, QueryWindow, RetryPolicy, SessionConfig, UtcDateTime, ValidationError,
    WhatToShow,
};

/// Days of history requested by default.
pub const DEFAULT_HORIZON_DAYS: i64 = 3650;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "VIX_5min_data.csv";

/// Everything one backfill run needs.
///
/// The default reproduces the standard job: ten years of 5-minute VIX trade
/// bars, all hours, from a gateway on localhost.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillConfig {
    pub session: SessionConfig,
    pub contract: Contract,
    pub horizon: Duration,
    pub bar_size: BarSize,
    pub what_to_show: WhatToShow,
    pub regular_hours_only: bool,
    pub output: PathBuf,
    pub retry: RetryPolicy,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            contract: Contract::default(),
            horizon: Duration::days(DEFAULT_HORIZON_DAYS),
            bar_size: BarSize::FiveMinutes,
            what_to_show: WhatToShow::Trades,
            regular_hours_only: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
            retry: RetryPolicy::none(),
        }
    }
}

impl BackfillConfig {
    /// Freezes the window against `now`.
    pub fn plan(&self, now: UtcDateTime) -> Result<BackfillPlan, ValidationError> {
        Ok(BackfillPlan {
            contract: self.contract.clone(),
            window: QueryWindow::ending_at(now, self.horizon)?,
            bar_size: self.bar_size,
            what_to_show: self.what_to_show,
            regular_hours_only: self.regular_hours_only,
            retry: self.retry,
        })
    }
}
