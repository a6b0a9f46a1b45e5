//! Travel-interval data model and validation.
//!
//! A [`TravelInterval`] is a closed calendar-date range spent inside the
//! reference zone. Both endpoints count as days present; an interval with
//! no end date is a trip still in progress and resolves its end to the
//! evaluation reference date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A single stay inside the reference zone, endpoints inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelInterval {
    /// Unique identifier (UUID string).
    pub id: String,
    /// Country/region visited. Informational: the 90/180 budget treats the
    /// whole zone as one pool, so this never affects the aggregate.
    pub zone_code: String,
    /// First day of presence.
    pub start_date: NaiveDate,
    /// Last day of presence. `None` while the trip is in progress.
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelInterval {
    /// Create a closed interval with a fresh id.
    pub fn new(zone_code: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            zone_code: zone_code.into(),
            start_date,
            end_date: Some(end_date),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an open-ended interval (trip in progress).
    pub fn open(zone_code: impl Into<String>, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            zone_code: zone_code.into(),
            start_date,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// End of the interval as of `reference`: an open interval counts
    /// through the reference date until it is closed.
    pub fn resolved_end(&self, reference: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(reference)
    }

    /// Length in days as of `reference`, endpoints inclusive.
    /// A single-day trip counts as 1; an open trip that has not started
    /// yet counts as 0.
    pub fn days(&self, reference: NaiveDate) -> i64 {
        ((self.resolved_end(reference) - self.start_date).num_days() + 1).max(0)
    }

    /// Check that the interval's own dates are well-formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::InvalidRange {
                    id: self.id.clone(),
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(())
    }
}

/// Validate a whole interval set: every range well-formed and no two
/// intervals sharing a calendar day. Overlaps are a user-input error and
/// are never silently merged, since collapsing them would hide data-entry
/// mistakes that affect legal compliance.
///
/// Open intervals resolve their end to `reference` before the check.
pub fn validate_intervals(
    intervals: &[TravelInterval],
    reference: NaiveDate,
) -> Result<(), ValidationError> {
    for interval in intervals {
        interval.validate()?;
    }

    let mut sorted: Vec<&TravelInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| (i.start_date, i.resolved_end(reference)));

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.start_date <= a.resolved_end(reference) {
            return Err(ValidationError::Overlap {
                first: a.id.clone(),
                second: b.id.clone(),
                day: b.start_date,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_single_day_trip_counts_one() {
        let trip = TravelInterval::new("FR", date(2024, 6, 1), date(2024, 6, 1));
        assert_eq!(trip.days(date(2024, 9, 1)), 1);
    }

    #[test]
    fn test_inclusive_day_count() {
        let trip = TravelInterval::new("FR", date(2024, 6, 1), date(2024, 6, 30));
        assert_eq!(trip.days(date(2024, 9, 1)), 30);
    }

    #[test]
    fn test_open_interval_counts_through_reference() {
        let trip = TravelInterval::open("DE", date(2024, 8, 28));
        assert_eq!(trip.days(date(2024, 9, 1)), 5);
        assert_eq!(trip.resolved_end(date(2024, 9, 1)), date(2024, 9, 1));
    }

    #[test]
    fn test_open_interval_not_yet_started_counts_zero() {
        let trip = TravelInterval::open("DE", date(2024, 9, 11));
        assert_eq!(trip.days(date(2024, 9, 1)), 0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut trip = TravelInterval::new("FR", date(2024, 6, 10), date(2024, 6, 1));
        trip.id = "bad".to_string();
        let err = trip.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidRange {
                id: "bad".to_string(),
                start: date(2024, 6, 10),
                end: date(2024, 6, 1),
            }
        );
    }

    #[test]
    fn test_overlap_detected() {
        let a = TravelInterval::new("FR", date(2024, 1, 1), date(2024, 1, 10));
        let b = TravelInterval::new("IT", date(2024, 1, 5), date(2024, 1, 15));
        let err = validate_intervals(&[a.clone(), b.clone()], date(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::Overlap { .. }));
    }

    #[test]
    fn test_adjacent_days_do_not_overlap() {
        let a = TravelInterval::new("FR", date(2024, 1, 1), date(2024, 1, 10));
        let b = TravelInterval::new("IT", date(2024, 1, 11), date(2024, 1, 15));
        assert!(validate_intervals(&[b, a], date(2024, 2, 1)).is_ok());
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        // Exit and re-entry on the same day is still two intervals
        // covering the same calendar day.
        let a = TravelInterval::new("FR", date(2024, 1, 1), date(2024, 1, 10));
        let b = TravelInterval::new("IT", date(2024, 1, 10), date(2024, 1, 15));
        assert!(validate_intervals(&[a, b], date(2024, 2, 1)).is_err());
    }

    #[test]
    fn test_open_interval_overlap_uses_reference_end() {
        let a = TravelInterval::open("FR", date(2024, 8, 1));
        let b = TravelInterval::new("IT", date(2024, 8, 20), date(2024, 8, 25));
        // As of 2024-09-01 the open interval spans past b's start.
        assert!(validate_intervals(&[a.clone(), b.clone()], date(2024, 9, 1)).is_err());
    }
}
