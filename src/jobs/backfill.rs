//! Placeholder logs for weekdays without attendance.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BackfillConfig;
use crate::models::{DailyLog, Employee, Punch, PunchType};
use crate::store::{
    EmployeeDirectory, JobKind, JobMarker, JobMarkerStore, PunchStore, StoreError, with_timeout,
};

use super::guard::RunGuard;
use super::{JobRun, SkipReason};

/// What one backfill run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// The date backfilled.
    pub date: NaiveDate,
    /// Placeholder logs written.
    pub inserted: usize,
    /// Employees who already had a log for the date.
    pub existing: usize,
    /// Employees that could not be checked or written.
    pub failed: usize,
    /// Tenants already processed for the date by an earlier run.
    pub tenants_skipped: usize,
}

impl BackfillReport {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            inserted: 0,
            existing: 0,
            failed: 0,
            tenants_skipped: 0,
        }
    }
}

/// Gives every active employee a log for every weekday.
///
/// An employee with no log for the target date gets a placeholder: a system
/// clock-in at the configured time and a clock-out a second later, which
/// reconciles to zero worked time. Existing logs are never touched, whatever
/// their punches.
pub struct MissingDayBackfill {
    punches: Arc<dyn PunchStore>,
    employees: Arc<dyn EmployeeDirectory>,
    markers: Arc<dyn JobMarkerStore>,
    config: BackfillConfig,
    timeout: Duration,
    guard: RunGuard,
}

impl MissingDayBackfill {
    /// Creates the job. `timeout` bounds every store call.
    pub fn new(
        punches: Arc<dyn PunchStore>,
        employees: Arc<dyn EmployeeDirectory>,
        markers: Arc<dyn JobMarkerStore>,
        config: BackfillConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            punches,
            employees,
            markers,
            config,
            timeout,
            guard: RunGuard::new(),
        }
    }

    /// Backfills `target`.
    ///
    /// # Returns
    ///
    /// - `Skipped(InFlight)` while another pass is running
    /// - `Skipped(NonWorkday)` for Saturdays and Sundays
    /// - `Skipped(StoreUnavailable)` when employees cannot be listed
    /// - `Completed` with per-employee counts otherwise
    pub async fn run_once(&self, target: NaiveDate) -> JobRun<BackfillReport> {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("backfill already running; skipping");
            return JobRun::Skipped(SkipReason::InFlight);
        };

        let weekday = target.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            debug!(date = %target, "backfill skipped for weekend");
            return JobRun::Skipped(SkipReason::NonWorkday(weekday));
        }

        let employees =
            match with_timeout(self.timeout, self.employees.list_active_employees()).await {
                Ok(employees) => employees,
                Err(error) => {
                    warn!(error = %error, "backfill cannot list employees; skipping");
                    return JobRun::Skipped(SkipReason::StoreUnavailable(error.to_string()));
                }
            };

        let mut report = BackfillReport::new(target);
        let mut by_tenant: BTreeMap<Uuid, Vec<Employee>> = BTreeMap::new();
        for employee in employees {
            match employee.tenant_id {
                Some(tenant_id) => by_tenant.entry(tenant_id).or_default().push(employee),
                None => {
                    warn!(employee_id = %employee.id, "employee has no tenant; cannot backfill");
                    report.failed += 1;
                }
            }
        }

        for (tenant_id, employees) in by_tenant {
            self.backfill_tenant(tenant_id, &employees, &mut report).await;
        }

        info!(
            date = %target,
            inserted = report.inserted,
            existing = report.existing,
            failed = report.failed,
            tenants_skipped = report.tenants_skipped,
            "backfill run finished"
        );
        JobRun::Completed(report)
    }

    async fn backfill_tenant(
        &self,
        tenant_id: Uuid,
        employees: &[Employee],
        report: &mut BackfillReport,
    ) {
        let marker = JobMarker {
            tenant_id,
            date: report.date,
            job: JobKind::Backfill,
        };
        match with_timeout(self.timeout, self.markers.try_claim(&marker)).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(tenant_id = %tenant_id, date = %report.date, "backfill already done");
                report.tenants_skipped += 1;
                return;
            }
            Err(error) => {
                warn!(tenant_id = %tenant_id, error = %error, "backfill marker claim failed");
                report.failed += employees.len();
                return;
            }
        }

        let mut failures = 0;
        for employee in employees {
            match self.backfill_employee(tenant_id, employee.id, report.date).await {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.existing += 1,
                Err(error) => {
                    warn!(
                        tenant_id = %tenant_id,
                        employee_id = %employee.id,
                        error = %error,
                        "backfill failed for employee"
                    );
                    failures += 1;
                }
            }
        }

        report.failed += failures;
        if failures > 0 {
            self.release(&marker).await;
        }
    }

    async fn release(&self, marker: &JobMarker) {
        if let Err(error) = with_timeout(self.timeout, self.markers.release(marker)).await {
            warn!(
                tenant_id = %marker.tenant_id,
                job = %marker.job,
                error = %error,
                "marker release failed"
            );
        }
    }

    /// Returns true when a placeholder was inserted.
    async fn backfill_employee(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let existing =
            with_timeout(self.timeout, self.punches.get_daily_log(employee_id, date)).await?;
        if existing.is_some() {
            return Ok(false);
        }

        let placeholder = self.placeholder(employee_id, tenant_id, date);
        match with_timeout(self.timeout, self.punches.insert_log(placeholder)).await {
            Ok(()) => Ok(true),
            Err(StoreError::DuplicateLog { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn placeholder(&self, employee_id: Uuid, tenant_id: Uuid, date: NaiveDate) -> DailyLog {
        let clock_in = date.and_time(self.config.placeholder_clock_in);
        let clock_out =
            clock_in + chrono::Duration::seconds(i64::from(self.config.placeholder_gap_seconds));
        let location = &self.config.placeholder_location;

        DailyLog::new(employee_id, tenant_id, date)
            .with_punch(Punch::system(PunchType::In, clock_in, location))
            .with_punch(Punch::system(PunchType::Out, clock_out, location))
    }
}
