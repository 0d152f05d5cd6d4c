//! Selection of the approved adjustment that overrides a day's punches.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::models::AdjustmentRequest;

/// The times taken from an approved adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideTimes {
    /// The adjustment the times come from.
    pub adjustment_id: Uuid,
    /// Replacement clock-in.
    pub clock_in: NaiveDateTime,
    /// Replacement clock-out, absent when the request leaves the shift open.
    pub clock_out: Option<NaiveDateTime>,
}

/// Whether a day's punches are replaced by an approved adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    /// Punches stand as recorded.
    None,
    /// Punches are replaced wholesale.
    Approved(OverrideTimes),
}

impl Override {
    /// Returns the override times, if any.
    pub fn times(&self) -> Option<&OverrideTimes> {
        match self {
            Override::None => None,
            Override::Approved(times) => Some(times),
        }
    }
}

/// Finds the approved adjustment for `employee_id` on `date`.
///
/// A request matches when its target date equals `date`: the date of its
/// original clock-in when present, otherwise its own date. Each request
/// therefore overrides at most one day. Pending and rejected requests, and
/// requests of other employees, never match.
///
/// When several approved requests match, the one decided earliest wins.
/// Requests without a decision time rank after decided ones and input order
/// breaks ties. A warning is logged so the duplicate can be cleaned up.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{Override, resolve_override};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// assert_eq!(resolve_override(&[], Uuid::new_v4(), date), Override::None);
/// ```
pub fn resolve_override(
    adjustments: &[AdjustmentRequest],
    employee_id: Uuid,
    date: NaiveDate,
) -> Override {
    let candidates: Vec<(usize, &AdjustmentRequest)> = adjustments
        .iter()
        .enumerate()
        .filter(|(_, adj)| {
            adj.employee_id == employee_id && adj.is_approved() && adj.applies_to(date)
        })
        .collect();

    if candidates.len() > 1 {
        warn!(
            employee_id = %employee_id,
            date = %date,
            count = candidates.len(),
            "multiple approved adjustments for one day; using the earliest decision"
        );
    }

    candidates
        .into_iter()
        .min_by_key(|(index, adj)| (adj.decided_at.is_none(), adj.decided_at, *index))
        .map_or(Override::None, |(_, adj)| {
            Override::Approved(OverrideTimes {
                adjustment_id: adj.id,
                clock_in: adj.requested_clock_in,
                clock_out: adj.requested_clock_out,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdjustmentStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, 0).unwrap()
    }

    fn request(employee_id: Uuid, status: AdjustmentStatus) -> AdjustmentRequest {
        AdjustmentRequest {
            id: Uuid::new_v4(),
            employee_id,
            tenant_id: Uuid::new_v4(),
            date: date(),
            original_clock_in: None,
            original_clock_out: None,
            requested_clock_in: at(date(), 8, 0),
            requested_clock_out: Some(at(date(), 16, 0)),
            reason: "Forgot to clock in".to_string(),
            status,
            submitted_at: at(date(), 18, 0),
            decided_at: None,
            decided_by: None,
        }
    }

    #[test]
    fn test_approved_request_overrides() {
        let employee = Uuid::new_v4();
        let adj = request(employee, AdjustmentStatus::Approved);

        match resolve_override(&[adj.clone()], employee, date()) {
            Override::Approved(times) => {
                assert_eq!(times.adjustment_id, adj.id);
                assert_eq!(times.clock_in, at(date(), 8, 0));
                assert_eq!(times.clock_out, Some(at(date(), 16, 0)));
            }
            Override::None => panic!("Expected approved override"),
        }
    }

    #[test]
    fn test_pending_and_rejected_are_ignored() {
        let employee = Uuid::new_v4();
        let adjustments = vec![
            request(employee, AdjustmentStatus::Pending),
            request(employee, AdjustmentStatus::Rejected),
        ];
        assert_eq!(
            resolve_override(&adjustments, employee, date()),
            Override::None
        );
    }

    #[test]
    fn test_other_employee_is_ignored() {
        let adj = request(Uuid::new_v4(), AdjustmentStatus::Approved);
        assert_eq!(
            resolve_override(&[adj], Uuid::new_v4(), date()),
            Override::None
        );
    }

    #[test]
    fn test_matches_only_original_clock_in_date() {
        let employee = Uuid::new_v4();
        let next_day = date().succ_opt().unwrap();
        let mut adj = request(employee, AdjustmentStatus::Approved);
        adj.date = next_day;
        adj.original_clock_in = Some(at(date(), 9, 0));

        assert!(resolve_override(&[adj.clone()], employee, date()).times().is_some());
        assert_eq!(resolve_override(&[adj], employee, next_day), Override::None);
    }

    #[test]
    fn test_earliest_decision_wins() {
        let employee = Uuid::new_v4();
        let mut undecided = request(employee, AdjustmentStatus::Approved);
        undecided.requested_clock_in = at(date(), 6, 0);
        let mut later = request(employee, AdjustmentStatus::Approved);
        later.decided_at = Some(at(date(), 20, 0));
        later.requested_clock_in = at(date(), 7, 0);
        let mut earlier = request(employee, AdjustmentStatus::Approved);
        earlier.decided_at = Some(at(date(), 19, 0));
        earlier.requested_clock_in = at(date(), 7, 30);

        let resolved = resolve_override(&[undecided, later, earlier.clone()], employee, date());
        assert_eq!(resolved.times().unwrap().adjustment_id, earlier.id);
    }

    #[test]
    fn test_input_order_breaks_ties() {
        let employee = Uuid::new_v4();
        let first = request(employee, AdjustmentStatus::Approved);
        let second = request(employee, AdjustmentStatus::Approved);

        let resolved = resolve_override(&[first.clone(), second], employee, date());
        assert_eq!(resolved.times().unwrap().adjustment_id, first.id);
    }
}
