//! Backward-sliding request window.

use time::Duration;

use crate::{UtcDateTime, ValidationError};

/// End/start pair walked backward one step at a time.
///
/// The end moves, the start is fixed. Iterating yields the end-timestamp of
/// each request until `end <= start`, which bounds the number of requests to
/// `ceil((end - start) / step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    end: UtcDateTime,
    start: UtcDateTime,
    step: Duration,
}

impl QueryWindow {
    /// Window covering `horizon` back from `now`, stepping one day.
    pub fn ending_at(now: UtcDateTime, horizon: Duration) -> Result<Self, ValidationError> {
        if !horizon.is_positive() {
            return Err(ValidationError::EmptyHorizon);
        }

        let start = now
            .checked_sub(horizon)
            .ok_or(ValidationError::TimestampOutOfRange)?;

        Ok(Self {
            end: now,
            start,
            step: Duration::DAY,
        })
    }

    pub fn with_step(self, step: Duration) -> Result<Self, ValidationError> {
        if !step.is_positive() {
            return Err(ValidationError::EmptyStep);
        }
        Ok(Self { step, ..self })
    }

    pub const fn end(&self) -> UtcDateTime {
        self.end
    }

    pub const fn start(&self) -> UtcDateTime {
        self.start
    }

    pub const fn step(&self) -> Duration {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.end <= self.start
    }

    /// Moves the end back by one step. Saturates at the start.
    pub fn advance(&mut self) {
        self.end = self
            .end
            .checked_sub(self.step)
            .filter(|next| *next > self.start)
            .unwrap_or(self.start);
    }

    /// Requests still to be issued.
    pub fn remaining_chunks(&self) -> u64 {
        if self.is_done() {
            return 0;
        }
        let span = (self.end.into_inner() - self.start.into_inner()).whole_nanoseconds();
        let step = self.step.whole_nanoseconds();
        let chunks = (span + step - 1) / step;
        u64::try_from(chunks).unwrap_or(u64::MAX)
    }
}

impl Iterator for QueryWindow {
    type Item = UtcDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }
        let current = self.end;
        self.advance();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining_chunks()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> UtcDateTime {
        UtcDateTime::parse("2024-10-17T15:30:00Z").expect("timestamp")
    }

    #[test]
    fn exact_multiple_has_no_extra_iteration() {
        let window = QueryWindow::ending_at(now(), Duration::days(3)).expect("window");
        assert_eq!(window.remaining_chunks(), 3);
        assert_eq!(window.count(), 3);
    }

    #[test]
    fn partial_day_rounds_up() {
        let window =
            QueryWindow::ending_at(now(), Duration::days(2) + Duration::hours(6)).expect("window");
        assert_eq!(window.remaining_chunks(), 3);
        assert_eq!(window.count(), 3);
    }

    #[test]
    fn ends_decrease_by_exactly_one_day() {
        let ends: Vec<_> = QueryWindow::ending_at(now(), Duration::days(4))
            .expect("window")
            .collect();

        assert_eq!(ends.first().copied(), Some(now()));
        for pair in ends.windows(2) {
            let delta = pair[0].into_inner() - pair[1].into_inner();
            assert_eq!(delta, Duration::DAY);
        }
    }

    #[test]
    fn ten_year_horizon_is_3650_requests() {
        let window = QueryWindow::ending_at(now(), Duration::days(365 * 10)).expect("window");
        assert_eq!(window.remaining_chunks(), 3650);
    }

    #[test]
    fn rejects_empty_horizon_and_step() {
        assert_eq!(
            QueryWindow::ending_at(now(), Duration::ZERO),
            Err(ValidationError::EmptyHorizon)
        );
        let window = QueryWindow::ending_at(now(), Duration::DAY).expect("window");
        assert_eq!(
            window.with_step(Duration::seconds(-1)),
            Err(ValidationError::EmptyStep)
        );
    }
}
