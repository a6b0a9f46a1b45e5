//! Trailing-window day accounting.
//!
//! The trailing window for a reference date R is the closed range
//! `[R - window_days + 1, R]`. Each interval is clipped to that window and
//! the clipped lengths are summed; the remaining budget may go negative to
//! signal an overstay and is floored only at display time.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::trip::{validate_intervals, TravelInterval};

/// Window length of the standard Schengen rule.
pub const WINDOW_DAYS: i64 = 180;
/// Day budget of the standard Schengen rule.
pub const BUDGET_DAYS: i64 = 90;

/// Evaluation context: the trailing window ending at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceWindow {
    /// Date the window ends at (inclusive), normally "today".
    pub reference_date: NaiveDate,
    /// Window length in days.
    pub window_days: i64,
}

impl ComplianceWindow {
    pub fn new(reference_date: NaiveDate, window_days: i64) -> Self {
        Self {
            reference_date,
            window_days,
        }
    }

    /// First day of the window (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.reference_date - Duration::days(self.window_days - 1)
    }

    /// Clip an interval to the window. Returns the number of interval days
    /// that fall inside it; zero when the clipped range is empty.
    pub fn days_counted(&self, interval: &TravelInterval) -> i64 {
        let start = interval.start_date.max(self.start());
        let end = interval.resolved_end(self.reference_date).min(self.reference_date);
        if end < start {
            0
        } else {
            (end - start).num_days() + 1
        }
    }
}

/// Per-interval contribution to the window total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalUsage {
    pub interval_id: String,
    pub zone_code: String,
    /// Full interval length as of the reference date.
    pub days_in_interval: i64,
    /// Days of the interval inside the trailing window.
    pub days_counted: i64,
}

/// Aggregate compliance picture as of a reference date.
///
/// Derived, never stored: recomputed on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    /// Sum of clipped interval lengths inside the window.
    pub total_days_in_window: i64,
    /// Signed remainder of the budget. Negative means overstay.
    pub days_remaining: i64,
    pub per_interval: Vec<IntervalUsage>,
}

impl ComplianceResult {
    /// Remaining days floored at zero, for display.
    pub fn display_days_remaining(&self) -> i64 {
        self.days_remaining.max(0)
    }

    pub fn is_overstay(&self) -> bool {
        self.days_remaining < 0
    }
}

/// The rolling-window compliance engine.
///
/// Side-effect free and cheap (linear in interval count per query), so it
/// can run on every edit. Window and budget default to the standard
/// 180/90 rule; they are parameterized only so tests can shrink them.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceCalculator {
    pub window_days: i64,
    pub budget_days: i64,
}

impl Default for ComplianceCalculator {
    fn default() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            budget_days: BUDGET_DAYS,
        }
    }
}

impl ComplianceCalculator {
    /// Create a calculator with the standard 180/90 limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom limits.
    pub fn with_limits(window_days: i64, budget_days: i64) -> Self {
        Self {
            window_days,
            budget_days,
        }
    }

    /// Compute per-interval and aggregate usage for the trailing window
    /// ending at `reference`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`ValidationError`] for an interval whose end
    /// precedes its start, or for any two intervals sharing a calendar
    /// day. No partial result is returned for malformed input.
    pub fn evaluate(
        &self,
        intervals: &[TravelInterval],
        reference: NaiveDate,
    ) -> Result<ComplianceResult, ValidationError> {
        validate_intervals(intervals, reference)?;

        let window = ComplianceWindow::new(reference, self.window_days);
        let per_interval: Vec<IntervalUsage> = intervals
            .iter()
            .map(|interval| IntervalUsage {
                interval_id: interval.id.clone(),
                zone_code: interval.zone_code.clone(),
                days_in_interval: interval.days(reference),
                days_counted: window.days_counted(interval),
            })
            .collect();

        let total_days_in_window: i64 = per_interval.iter().map(|u| u.days_counted).sum();

        Ok(ComplianceResult {
            reference_date: reference,
            window_start: window.start(),
            total_days_in_window,
            days_remaining: self.budget_days - total_days_in_window,
            per_interval,
        })
    }

    /// Budget left on `candidate` without mutating stored state. Signed:
    /// negative means the traveler would already be in overstay that day.
    pub fn days_remaining_on(
        &self,
        intervals: &[TravelInterval],
        candidate: NaiveDate,
    ) -> Result<i64, ValidationError> {
        Ok(self.evaluate(intervals, candidate)?.days_remaining)
    }

    /// Longest hypothetical stay starting on `entry` that never exhausts
    /// the budget on any day of the stay. The hypothetical interval is
    /// appended day by day and the window recomputed per day, since the
    /// window slides under the stay as it grows.
    ///
    /// Returns 0 when even the entry day would bust the budget.
    pub fn max_stay_from(
        &self,
        intervals: &[TravelInterval],
        entry: NaiveDate,
    ) -> Result<i64, ValidationError> {
        validate_intervals(intervals, entry)?;

        let mut stay = 0;
        while stay < self.budget_days {
            let day = entry + Duration::days(stay);
            let mut hypothetical = intervals.to_vec();
            hypothetical.push(TravelInterval::new("??", entry, day));
            match self.evaluate(&hypothetical, day) {
                Ok(result) if result.days_remaining >= 0 => stay += 1,
                Ok(_) => break,
                // The hypothetical stay ran into an existing interval.
                Err(ValidationError::Overlap { .. }) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(stay)
    }
}
