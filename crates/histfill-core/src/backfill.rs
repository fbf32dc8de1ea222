//! Chunked backfill driver.
//!
//! Walks a [`QueryWindow`] backward one day per request, prepending each
//! reply to a [`ResultTable`]. Any request failure aborts the walk and the
//! accumulated rows are dropped with it.

use std::path::PathBuf;

use serde::Serialize;

use crate::gateway::{GatewaySession, HistoricalBarsRequest, HistoricalSource};
use crate::{
    Bar, BarSize, BackfillConfig, BackfillError, Contract, CsvSink, DurationSpec, GatewayError,
    QueryWindow, ResultTable, RetryPolicy, UtcDateTime, WhatToShow,
};

/// Everything the driver needs for one walk.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillPlan {
    pub contract: Contract,
    pub window: QueryWindow,
    pub bar_size: BarSize,
    pub what_to_show: WhatToShow,
    pub regular_hours_only: bool,
    pub retry: RetryPolicy,
}

impl BackfillPlan {
    /// Request span per iteration.
    pub const CHUNK: DurationSpec = DurationSpec::days(1);

    pub fn request_ending_at(&self, end: UtcDateTime) -> HistoricalBarsRequest {
        HistoricalBarsRequest {
            contract: self.contract.clone(),
            end,
            duration: Self::CHUNK,
            bar_size: self.bar_size,
            what_to_show: self.what_to_show,
            regular_hours_only: self.regular_hours_only,
        }
    }
}

/// Result of a completed walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackfillOutcome {
    pub table: ResultTable,
    pub requests: u64,
    pub empty_requests: u64,
}

/// Runs the backward walk against `source`.
///
/// # Errors
///
/// Returns the first [`GatewayError`] that survives the retry policy. Rows
/// gathered before the failure are discarded.
pub async fn backfill<S>(source: &mut S, plan: &BackfillPlan) -> Result<BackfillOutcome, GatewayError>
where
    S: HistoricalSource + ?Sized,
{
    let mut outcome = BackfillOutcome::default();
    tracing::info!(
        contract = %plan.contract,
        start = %plan.window.start(),
        end = %plan.window.end(),
        requests = plan.window.remaining_chunks(),
        "starting backfill"
    );

    for end in plan.window {
        tracing::info!("downloading {} data up to {end}", plan.bar_size);

        let req = plan.request_ending_at(end);
        let bars = fetch_with_retry(source, &req, &plan.retry).await?;

        outcome.requests += 1;
        if bars.is_empty() {
            outcome.empty_requests += 1;
            tracing::debug!(%end, "no bars in window");
        }
        outcome.table.prepend(bars);
    }

    tracing::info!(
        rows = outcome.table.len(),
        requests = outcome.requests,
        empty_requests = outcome.empty_requests,
        "download complete"
    );
    Ok(outcome)
}

async fn fetch_with_retry<S>(
    source: &mut S,
    req: &HistoricalBarsRequest,
    policy: &RetryPolicy,
) -> Result<Vec<Bar>, GatewayError>
where
    S: HistoricalSource + ?Sized,
{
    let mut attempt = 0;
    loop {
        match source.fetch_bars(req).await {
            Ok(bars) => return Ok(bars),
            Err(error) if policy.should_retry(attempt, &error) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    %error,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying historical request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub contract: String,
    pub output: PathBuf,
    pub rows: usize,
    pub requests: u64,
    pub empty_requests: u64,
    pub preview: Vec<Bar>,
}

/// Rows shown after a successful run.
pub const PREVIEW_ROWS: usize = 5;

/// Connect, walk the window, disconnect, then write the table.
///
/// The session is closed whether or not the walk succeeds. The output file is
/// only touched after every request has succeeded.
pub async fn run(config: &BackfillConfig, now: UtcDateTime) -> Result<RunSummary, BackfillError> {
    let plan = config.plan(now)?;
    let sink = CsvSink::new(&config.output);

    let mut session = GatewaySession::connect(&config.session).await?;
    let walked = backfill(&mut session, &plan).await;
    session.disconnect().await;

    let outcome = walked?;
    sink.write(&outcome.table)?;

    Ok(RunSummary {
        contract: plan.contract.to_string(),
        output: sink.path().to_path_buf(),
        rows: outcome.table.len(),
        requests: outcome.requests,
        empty_requests: outcome.empty_requests,
        preview: outcome.table.head(PREVIEW_ROWS),
    })
}
