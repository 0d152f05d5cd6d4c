//! Submission and decision of adjustment requests.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentRequest, AdjustmentStatus};
use crate::store::{AdjustmentFilter, AdjustmentStore, Decision, with_timeout};
use crate::validation::{parse_timestamp, parse_uuid};

/// An adjustment request as submitted by a client, before validation.
///
/// # Example
///
/// ```
/// use attendance_engine::adjustment::AdjustmentSubmission;
///
/// let submission: AdjustmentSubmission = serde_json::from_str(r#"{
///     "employee_id": "6f1c2b1e-3d4a-4c55-9e0f-0a1b2c3d4e5f",
///     "tenant_id": "0b6f4c55-9e0f-4a1b-8c3d-4e5f6f1c2b1e",
///     "date": "2026-01-15",
///     "requested_clock_in": "2026-01-15T08:00:00",
///     "requested_clock_out": "2026-01-15T17:00:00",
///     "reason": "Forgot to clock in"
/// }"#).unwrap();
/// assert!(submission.original_clock_in.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSubmission {
    /// The employee asking for the correction.
    pub employee_id: String,
    /// The employee's tenant.
    pub tenant_id: String,
    /// The day being corrected, `YYYY-MM-DD`.
    pub date: String,
    /// Clock-in recorded before the correction.
    #[serde(default)]
    pub original_clock_in: Option<String>,
    /// Clock-out recorded before the correction.
    #[serde(default)]
    pub original_clock_out: Option<String>,
    /// Clock-in the employee asks for.
    pub requested_clock_in: String,
    /// Clock-out the employee asks for.
    #[serde(default)]
    pub requested_clock_out: Option<String>,
    /// Why the correction is needed.
    pub reason: String,
}

impl AdjustmentSubmission {
    /// Validates the submission and builds a pending request.
    fn into_request(self, now: NaiveDateTime) -> EngineResult<AdjustmentRequest> {
        let employee_id = parse_uuid("employee_id", &self.employee_id)?;
        let tenant_id = parse_uuid("tenant_id", &self.tenant_id)?;
        let date = NaiveDate::from_str(self.date.trim()).map_err(|e| EngineError::Validation {
            field: "date".to_string(),
            message: e.to_string(),
        })?;
        let optional = |field: &str, value: Option<String>| {
            value
                .map(|raw| parse_timestamp(field, &raw))
                .transpose()
        };
        let original_clock_in = optional("original_clock_in", self.original_clock_in)?;
        let original_clock_out = optional("original_clock_out", self.original_clock_out)?;
        let requested_clock_in = parse_timestamp("requested_clock_in", &self.requested_clock_in)?;
        let requested_clock_out = optional("requested_clock_out", self.requested_clock_out)?;

        if requested_clock_out.is_some_and(|out| out < requested_clock_in) {
            return Err(EngineError::Validation {
                field: "requested_clock_out".to_string(),
                message: "must not be before requested_clock_in".to_string(),
            });
        }
        let reason = self.reason.trim().to_string();
        if reason.is_empty() {
            return Err(EngineError::Validation {
                field: "reason".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(AdjustmentRequest {
            id: Uuid::new_v4(),
            employee_id,
            tenant_id,
            date,
            original_clock_in,
            original_clock_out,
            requested_clock_in,
            requested_clock_out,
            reason,
            status: AdjustmentStatus::Pending,
            submitted_at: now,
            decided_at: None,
            decided_by: None,
        })
    }
}

/// Owns the adjustment request lifecycle.
///
/// Pending requests move to Approved or Rejected exactly once. Nobody may
/// decide their own request, and a second approval for an employee's day is
/// refused while another approved request already covers it.
pub struct AdjustmentAuthority {
    store: Arc<dyn AdjustmentStore>,
    timeout: Duration,
}

impl AdjustmentAuthority {
    /// Creates an authority over `store`, bounding each call by `timeout`.
    pub fn new(store: Arc<dyn AdjustmentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Validates and records a new pending request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for malformed ids, dates or times,
    /// an empty reason, or a requested clock-out before the clock-in.
    pub async fn submit(
        &self,
        submission: AdjustmentSubmission,
        now: NaiveDateTime,
    ) -> EngineResult<AdjustmentRequest> {
        let request = submission.into_request(now)?;
        with_timeout(self.timeout, self.store.save_adjustment(request.clone())).await?;

        info!(
            adjustment_id = %request.id,
            employee_id = %request.employee_id,
            date = %request.date,
            "adjustment request submitted"
        );
        Ok(request)
    }

    /// Approves a pending request.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AdjustmentNotFound`] if the tenant has no such request
    /// - [`EngineError::Unauthorized`] if the approver owns the request
    /// - [`EngineError::InvalidTransition`] if the request was already decided
    /// - [`EngineError::AdjustmentConflict`] if another approved request covers the same day
    pub async fn approve(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        approver_id: Uuid,
        now: NaiveDateTime,
    ) -> EngineResult<AdjustmentRequest> {
        let mut request = self.load_for_decision(tenant_id, id, approver_id).await?;
        request.approve(approver_id, now)?;
        self.persist_decision(request).await
    }

    /// Rejects a pending request.
    ///
    /// # Errors
    ///
    /// The same as [`AdjustmentAuthority::approve`], minus the conflict check.
    pub async fn reject(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        approver_id: Uuid,
        now: NaiveDateTime,
    ) -> EngineResult<AdjustmentRequest> {
        let mut request = self.load_for_decision(tenant_id, id, approver_id).await?;
        request.reject(approver_id, now)?;
        self.persist_decision(request).await
    }

    /// Lists a tenant's requests passing `filter`.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &AdjustmentFilter,
    ) -> EngineResult<Vec<AdjustmentRequest>> {
        Ok(with_timeout(self.timeout, self.store.list_adjustments(tenant_id, filter)).await?)
    }

    /// The approved requests of one employee, ready for reconciliation.
    pub async fn approved_for(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
    ) -> EngineResult<Vec<AdjustmentRequest>> {
        self.list(tenant_id, &AdjustmentFilter::approved_for(employee_id))
            .await
    }

    async fn load_for_decision(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        approver_id: Uuid,
    ) -> EngineResult<AdjustmentRequest> {
        let request = with_timeout(self.timeout, self.store.get_adjustment(tenant_id, id))
            .await?
            .ok_or(EngineError::AdjustmentNotFound { id })?;

        if request.employee_id == approver_id {
            return Err(EngineError::Unauthorized {
                actor: approver_id,
                action: format!("decide their own adjustment request {id}"),
            });
        }
        Ok(request)
    }

    /// Writes the decision only if the stored request is still pending and,
    /// for approvals, no other approved request holds the same day.
    async fn persist_decision(&self, request: AdjustmentRequest) -> EngineResult<AdjustmentRequest> {
        let decision = with_timeout(self.timeout, self.store.decide_adjustment(&request)).await?;
        match decision {
            Decision::Applied => {}
            Decision::NotFound => return Err(EngineError::AdjustmentNotFound { id: request.id }),
            Decision::AlreadyDecided(from) => {
                return Err(EngineError::InvalidTransition {
                    id: request.id,
                    from,
                    to: request.status,
                });
            }
            Decision::Conflict { existing_id } => {
                warn!(
                    adjustment_id = %request.id,
                    existing_id = %existing_id,
                    employee_id = %request.employee_id,
                    date = %request.target_date(),
                    "approval refused; day already has an approved adjustment"
                );
                return Err(EngineError::AdjustmentConflict {
                    employee_id: request.employee_id,
                    date: request.target_date(),
                    existing_id,
                });
            }
        }

        info!(
            adjustment_id = %request.id,
            employee_id = %request.employee_id,
            status = %request.status,
            "adjustment request decided"
        );
        Ok(request)
    }
}
