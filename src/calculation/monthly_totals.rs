//! Monthly aggregation of reconciled shifts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Shift;

/// A calendar month, displayed and serialized as `YYYY-MM`.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::MonthKey;
/// use chrono::NaiveDate;
///
/// let key = MonthKey::of(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
/// assert_eq!(key.to_string(), "2026-03");
/// assert_eq!("2026-03".parse::<MonthKey>().unwrap(), key);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
}

impl MonthKey {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation {
            field: "month".to_string(),
            message: format!("'{s}' is not a YYYY-MM month"),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for MonthKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Worked time and attendance counts for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The month summarized.
    pub month: MonthKey,
    /// Sum of worked minutes over the month's shifts.
    pub worked_minutes: i64,
    /// Days with a real clock-in (placeholders excluded).
    pub days_present: u32,
    /// Days whose times came from an approved adjustment.
    pub adjusted_days: u32,
}

impl MonthlySummary {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            worked_minutes: 0,
            days_present: 0,
            adjusted_days: 0,
        }
    }

    fn add(&mut self, shift: &Shift) {
        self.worked_minutes += shift.worked_minutes;
        if shift.clock_in.is_some() && !shift.is_placeholder {
            self.days_present += 1;
        }
        if shift.has_adjustment {
            self.adjusted_days += 1;
        }
    }

    /// Worked time in hours.
    pub fn worked_hours(&self) -> Decimal {
        Decimal::new(self.worked_minutes, 0) / Decimal::new(60, 0)
    }
}

/// Sums shifts per calendar month.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{MonthKey, monthly_totals};
/// use attendance_engine::models::Shift;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let shift = Shift::new(day, Uuid::new_v4(), day.and_hms_opt(9, 0, 0), day.and_hms_opt(17, 0, 0));
///
/// let totals = monthly_totals(&[shift]);
/// assert_eq!(totals[&MonthKey::of(day)].worked_minutes, 480);
/// ```
pub fn monthly_totals(shifts: &[Shift]) -> BTreeMap<MonthKey, MonthlySummary> {
    let mut totals: BTreeMap<MonthKey, MonthlySummary> = BTreeMap::new();
    for shift in shifts {
        let key = MonthKey::of(shift.date);
        totals
            .entry(key)
            .or_insert_with(|| MonthlySummary::empty(key))
            .add(shift);
    }
    totals
}

/// Totals for the month containing `today`, counting shifts up to and
/// including `today`.
pub fn month_to_date(shifts: &[Shift], today: NaiveDate) -> MonthlySummary {
    let key = MonthKey::of(today);
    let mut summary = MonthlySummary::empty(key);
    for shift in shifts
        .iter()
        .filter(|shift| MonthKey::of(shift.date) == key && shift.date <= today)
    {
        summary.add(shift);
    }
    summary
}
