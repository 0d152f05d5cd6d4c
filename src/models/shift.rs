//! Shift model.
//!
//! A [`Shift`] is the derived clock-in/clock-out view of one employee's day,
//! produced by the shift reconciler. It is never stored on its own.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authoritative view of one employee's working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// The date the shift is keyed to.
    pub date: NaiveDate,
    /// The employee who worked the shift.
    pub employee_id: Uuid,
    /// Earliest clock-in of the day, or the approved adjustment's clock-in.
    pub clock_in: Option<NaiveDateTime>,
    /// Latest clock-out of the day, or the approved adjustment's clock-out.
    pub clock_out: Option<NaiveDateTime>,
    /// Whole minutes between clock-in and clock-out, never negative.
    pub worked_minutes: i64,
    /// True when an approved adjustment supplied the times.
    pub has_adjustment: bool,
    /// True when every punch of the day was written by the backfill job.
    #[serde(default)]
    pub is_placeholder: bool,
}

impl Shift {
    /// Builds a shift from raw times, deriving the worked duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Shift;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let shift = Shift::new(
    ///     date,
    ///     Uuid::new_v4(),
    ///     date.and_hms_opt(9, 0, 0),
    ///     date.and_hms_opt(17, 0, 0),
    /// );
    /// assert_eq!(shift.worked_minutes, 480);
    /// assert_eq!(shift.worked_hours(), Decimal::new(8, 0));
    /// ```
    pub fn new(
        date: NaiveDate,
        employee_id: Uuid,
        clock_in: Option<NaiveDateTime>,
        clock_out: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            date,
            employee_id,
            clock_in,
            clock_out,
            worked_minutes: worked_minutes_between(clock_in, clock_out),
            has_adjustment: false,
            is_placeholder: false,
        }
    }

    /// The worked duration as a chrono `Duration`.
    pub fn worked_duration(&self) -> Duration {
        Duration::minutes(self.worked_minutes)
    }

    /// The worked duration in hours.
    pub fn worked_hours(&self) -> Decimal {
        Decimal::new(self.worked_minutes, 0) / Decimal::new(60, 0)
    }

    /// True when the employee clocked in but never out.
    pub fn is_open(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_none()
    }

    /// Returns the day of the week for the shift.
    pub fn day_of_week(&self) -> Weekday {
        self.date.weekday()
    }
}

/// `max(0, clock_out - clock_in)` in whole minutes when both are present, else 0.
///
/// Seconds are truncated, so a one-second span counts as zero.
pub fn worked_minutes_between(
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
) -> i64 {
    match (clock_in, clock_out) {
        (Some(start), Some(end)) => (end - start).num_minutes().max(0),
        _ => 0,
    }
}
