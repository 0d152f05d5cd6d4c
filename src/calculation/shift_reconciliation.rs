//! Shift reconciliation.
//!
//! Turns raw punches into one [`Shift`] per employee per calendar date. The
//! earliest clock-in and the latest clock-out of the day win, so duplicate
//! and out-of-order punches are harmless. An approved adjustment for the day
//! replaces both times.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{AdjustmentRequest, DailyLog, Punch, Shift, worked_minutes_between};

use super::adjustment_override::{Override, resolve_override};

/// Running min/max over the punches of one day.
#[derive(Debug, Clone, Copy)]
struct DayPunches {
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
    all_auto_generated: bool,
}

impl Default for DayPunches {
    fn default() -> Self {
        Self {
            clock_in: None,
            clock_out: None,
            all_auto_generated: true,
        }
    }
}

impl DayPunches {
    fn add(&mut self, punch: &Punch) {
        if punch.is_in() {
            self.clock_in = Some(
                self.clock_in
                    .map_or(punch.timestamp, |current| current.min(punch.timestamp)),
            );
        } else {
            self.clock_out = Some(
                self.clock_out
                    .map_or(punch.timestamp, |current| current.max(punch.timestamp)),
            );
        }
        self.all_auto_generated &= punch.auto_generated;
    }

    fn into_shift(
        self,
        date: NaiveDate,
        employee_id: Uuid,
        adjustments: &[AdjustmentRequest],
    ) -> Shift {
        match resolve_override(adjustments, employee_id, date) {
            Override::Approved(times) => Shift {
                date,
                employee_id,
                clock_in: Some(times.clock_in),
                clock_out: times.clock_out,
                worked_minutes: worked_minutes_between(Some(times.clock_in), times.clock_out),
                has_adjustment: true,
                is_placeholder: false,
            },
            Override::None => Shift {
                is_placeholder: self.all_auto_generated,
                ..Shift::new(date, employee_id, self.clock_in, self.clock_out)
            },
        }
    }
}

/// Reconciles one employee's raw punches into daily shifts.
///
/// # Arguments
///
/// * `employee_id` - The employee the punches belong to
/// * `punches` - Punches in any order, possibly spanning many days
/// * `adjustments` - Adjustment requests; only approved ones for this employee apply
///
/// # Returns
///
/// One shift per date that has at least one punch, in ascending date order.
///
/// A clock-out recorded after midnight is attributed to the previous day when
/// that day's shift is still open and no clock-in has been recorded on the
/// clock-out's own date.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::reconcile;
/// use attendance_engine::models::Punch;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let punches = vec![
///     Punch::clock_in(day.and_hms_opt(9, 0, 0).unwrap()),
///     Punch::clock_in(day.and_hms_opt(9, 5, 0).unwrap()),
///     Punch::clock_out(day.and_hms_opt(17, 0, 0).unwrap()),
/// ];
///
/// let shifts = reconcile(Uuid::new_v4(), &punches, &[]);
/// assert_eq!(shifts.len(), 1);
/// assert_eq!(shifts[0].worked_minutes, 8 * 60);
/// ```
pub fn reconcile(
    employee_id: Uuid,
    punches: &[Punch],
    adjustments: &[AdjustmentRequest],
) -> Vec<Shift> {
    let mut ordered: Vec<&Punch> = punches.iter().collect();
    ordered.sort_by_key(|punch| (punch.timestamp, !punch.is_in()));

    let mut days: BTreeMap<NaiveDate, DayPunches> = BTreeMap::new();
    let mut open_since: Option<NaiveDate> = None;

    for punch in ordered {
        let own_date = punch.date();
        let date = if punch.is_in() {
            open_since = Some(own_date);
            own_date
        } else {
            let clocked_in_today = days
                .get(&own_date)
                .is_some_and(|day| day.clock_in.is_some());
            let carried = match open_since {
                Some(open) if !clocked_in_today && open.succ_opt() == Some(own_date) => open,
                _ => own_date,
            };
            open_since = None;
            carried
        };
        days.entry(date).or_default().add(punch);
    }

    days.into_iter()
        .map(|(date, day)| day.into_shift(date, employee_id, adjustments))
        .collect()
}

/// Reconciles stored daily logs into shifts.
///
/// Each log is keyed by its own date, so a clock-out appended to a log after
/// midnight stays with the shift it closes. Logs without punches produce no
/// shift. The result is ordered by date, then employee.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::reconcile_logs;
/// use attendance_engine::models::{DailyLog, Punch};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let log = DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), day)
///     .with_punch(Punch::clock_in(day.and_hms_opt(22, 0, 0).unwrap()))
///     .with_punch(Punch::clock_out(day.succ_opt().unwrap().and_hms_opt(6, 0, 0).unwrap()));
///
/// let shifts = reconcile_logs(&[log], &[]);
/// assert_eq!(shifts[0].date, day);
/// assert_eq!(shifts[0].worked_minutes, 8 * 60);
/// ```
pub fn reconcile_logs(logs: &[DailyLog], adjustments: &[AdjustmentRequest]) -> Vec<Shift> {
    let mut days: BTreeMap<(NaiveDate, Uuid), DayPunches> = BTreeMap::new();

    for log in logs.iter().filter(|log| !log.punches.is_empty()) {
        let day = days.entry((log.date, log.employee_id)).or_default();
        for punch in &log.punches {
            day.add(punch);
        }
    }

    days.into_iter()
        .map(|((date, employee_id), day)| day.into_shift(date, employee_id, adjustments))
        .collect()
}
