//! Adjustment request models.
//!
//! An [`AdjustmentRequest`] is an employee's correction to a day's recorded
//! times. It starts [`AdjustmentStatus::Pending`] and is decided exactly once.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle state of an adjustment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted; the request overrides the day's punches.
    Approved,
    /// Declined; the request is ignored by reconciliation.
    Rejected,
}

impl AdjustmentStatus {
    /// Approved and Rejected are terminal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// An employee-submitted correction to a day's recorded times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    /// Unique identifier of the request.
    pub id: Uuid,
    /// The employee whose day is being corrected.
    pub employee_id: Uuid,
    /// The tenant the employee belongs to.
    pub tenant_id: Uuid,
    /// The calendar date being corrected.
    pub date: NaiveDate,
    /// Clock-in recorded before the correction, if any.
    pub original_clock_in: Option<NaiveDateTime>,
    /// Clock-out recorded before the correction, if any.
    pub original_clock_out: Option<NaiveDateTime>,
    /// The clock-in the employee asks for.
    pub requested_clock_in: NaiveDateTime,
    /// The clock-out the employee asks for.
    pub requested_clock_out: Option<NaiveDateTime>,
    /// Why the correction is needed.
    pub reason: String,
    /// Current lifecycle state.
    pub status: AdjustmentStatus,
    /// When the request was submitted.
    pub submitted_at: NaiveDateTime,
    /// When the request was approved or rejected.
    #[serde(default)]
    pub decided_at: Option<NaiveDateTime>,
    /// Who approved or rejected the request.
    #[serde(default)]
    pub decided_by: Option<Uuid>,
}

impl AdjustmentRequest {
    /// The single day this request corrects: the date of the original
    /// clock-in when one was recorded, otherwise the request's own date.
    pub fn target_date(&self) -> NaiveDate {
        self.original_clock_in.map_or(self.date, |t| t.date())
    }

    /// True when this request corrects `date`.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.target_date() == date
    }

    /// True once the request has been approved.
    pub fn is_approved(&self) -> bool {
        self.status == AdjustmentStatus::Approved
    }

    /// Moves a pending request to Approved.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTransition`] if the request was already decided.
    pub fn approve(&mut self, approver: Uuid, at: NaiveDateTime) -> EngineResult<()> {
        self.decide(AdjustmentStatus::Approved, approver, at)
    }

    /// Moves a pending request to Rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTransition`] if the request was already decided.
    pub fn reject(&mut self, approver: Uuid, at: NaiveDateTime) -> EngineResult<()> {
        self.decide(AdjustmentStatus::Rejected, approver, at)
    }

    fn decide(&mut self, to: AdjustmentStatus, approver: Uuid, at: NaiveDateTime) -> EngineResult<()> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.decided_at = Some(at);
        self.decided_by = Some(approver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn pending(day: u32) -> AdjustmentRequest {
        AdjustmentRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            date: date(day),
            original_clock_in: None,
            original_clock_out: None,
            requested_clock_in: date(day).and_hms_opt(8, 0, 0).unwrap(),
            requested_clock_out: date(day).and_hms_opt(16, 0, 0),
            reason: "Forgot to clock in".to_string(),
            status: AdjustmentStatus::Pending,
            submitted_at: date(day).and_hms_opt(18, 0, 0).unwrap(),
            decided_at: None,
            decided_by: None,
        }
    }

    #[test]
    fn test_applies_to_own_date() {
        let request = pending(3);
        assert!(request.applies_to(date(3)));
        assert!(!request.applies_to(date(4)));
    }

    #[test]
    fn test_original_clock_in_date_takes_precedence() {
        let mut request = pending(3);
        request.original_clock_in = date(2).and_hms_opt(21, 0, 0);

        assert_eq!(request.target_date(), date(2));
        assert!(request.applies_to(date(2)));
        assert!(!request.applies_to(date(3)));
    }

    #[test]
    fn test_approve_records_decision() {
        let mut request = pending(3);
        let approver = Uuid::new_v4();
        let at = date(4).and_hms_opt(9, 0, 0).unwrap();

        request.approve(approver, at).unwrap();

        assert!(request.is_approved());
        assert_eq!(request.decided_by, Some(approver));
        assert_eq!(request.decided_at, Some(at));
    }

    #[test]
    fn test_decided_request_cannot_be_reopened() {
        let mut request = pending(3);
        let at = date(4).and_hms_opt(9, 0, 0).unwrap();
        request.reject(Uuid::new_v4(), at).unwrap();

        let result = request.approve(Uuid::new_v4(), at);
        match result {
            Err(EngineError::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, AdjustmentStatus::Rejected);
                assert_eq!(to, AdjustmentStatus::Approved);
            }
            _ => panic!("Expected InvalidTransition error"),
        }
        assert_eq!(request.status, AdjustmentStatus::Rejected);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!AdjustmentStatus::Pending.is_terminal());
        assert!(AdjustmentStatus::Approved.is_terminal());
        assert!(AdjustmentStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AdjustmentStatus::Approved).unwrap(),
            "\"approved\""
        );
        let status: AdjustmentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, AdjustmentStatus::Rejected);
    }
}
