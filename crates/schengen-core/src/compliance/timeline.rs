//! Day-by-day running totals for remaining-days charts.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::trip::TravelInterval;

use super::engine::ComplianceCalculator;

/// One point of a remaining-days timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    pub total_days_in_window: i64,
    pub days_remaining: i64,
}

impl ComplianceCalculator {
    /// Running totals for every day of `[from, to]`, inclusive. The window
    /// is recomputed in full for each day; the interval set is small and
    /// can mutate between queries, so no incremental state is kept.
    ///
    /// Empty when `from > to`.
    pub fn timeline(
        &self,
        intervals: &[TravelInterval],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayUsage>, ValidationError> {
        let mut series = Vec::new();
        let mut day = from;
        while day <= to {
            let result = self.evaluate(intervals, day)?;
            series.push(DayUsage {
                date: day,
                total_days_in_window: result.total_days_in_window,
                days_remaining: result.days_remaining,
            });
            day += Duration::days(1);
        }
        Ok(series)
    }
}
